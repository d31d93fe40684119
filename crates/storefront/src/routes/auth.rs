//! Login, registration and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use greenbasket_core::{Email, Role};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_identity, set_identity};
use crate::models::Identity;
use crate::services::users::RegistrationRequest;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email_id: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub form: RegisterForm,
    pub errors: FieldErrors,
    pub submit_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub success: Option<String>,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> LoginTemplate {
    let success = query.success.as_deref().and_then(|code| match code {
        "registered" => Some("Registration successful. Please log in.".to_owned()),
        "logged_out" => Some("You have been logged out.".to_owned()),
        _ => None,
    });

    LoginTemplate {
        email_id: String::new(),
        error: None,
        success,
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub password: String,
}

/// Handle a login submission.
///
/// A buyer lands on the product listing, a seller on the dashboard. Failed
/// attempts re-render the form with the service's message inline.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email_id.trim().is_empty() || form.password.is_empty() {
        return LoginTemplate {
            email_id: form.email_id,
            error: Some("Email and password are required.".to_owned()),
            success: None,
        }
        .into_response();
    }

    match state.users().login(form.email_id.trim(), &form.password).await {
        Ok(data) => {
            let identity = Identity {
                user_id: data.user_id,
                full_name: data
                    .full_name
                    .unwrap_or_else(|| form.email_id.trim().to_owned()),
                role: data.role,
                token: data.token,
            };

            if let Err(err) = set_identity(&session, &identity).await {
                tracing::error!(error = %err, "Failed to persist identity");
                return LoginTemplate {
                    email_id: form.email_id,
                    error: Some("Something went wrong. Please try again.".to_owned()),
                    success: None,
                }
                .into_response();
            }

            set_sentry_user(&identity.user_id);
            tracing::info!(user_id = %identity.user_id, role = identity.role.label(), "User logged in");

            match identity.role {
                Role::Seller => Redirect::to("/dashboard").into_response(),
                Role::Buyer => Redirect::to("/home").into_response(),
            }
        }
        Err(err) => {
            let message = err
                .rejection_message()
                .map_or_else(
                    || {
                        tracing::warn!(error = %err, "Login call failed");
                        "Unable to reach the login service. Please try again.".to_owned()
                    },
                    String::from,
                );
            LoginTemplate {
                email_id: form.email_id,
                error: Some(message),
                success: None,
            }
            .into_response()
        }
    }
}

/// Registration form fields, echoed back on validation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_id: String,
}

/// Per-field validation messages for the registration form.
#[derive(Debug, Default)]
pub struct FieldErrors {
    pub first_name: Option<&'static str>,
    pub last_name: Option<&'static str>,
    pub address: Option<&'static str>,
    pub email_id: Option<&'static str>,
    pub password: Option<&'static str>,
    pub user_id: Option<&'static str>,
}

impl FieldErrors {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.address.is_none()
            && self.email_id.is_none()
            && self.password.is_none()
            && self.user_id.is_none()
    }
}

/// Validate the registration form field by field.
fn validate_registration(form: &RegisterForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if form.first_name.trim().is_empty() {
        errors.first_name = Some("First name is required.");
    }
    if form.last_name.trim().is_empty() {
        errors.last_name = Some("Last name is required.");
    }
    if form.address.trim().is_empty() {
        errors.address = Some("Address is required.");
    }
    if form.user_id.trim().is_empty() {
        errors.user_id = Some("Username is required.");
    }

    match Email::parse(form.email_id.trim()) {
        Ok(_) => {}
        Err(_) if form.email_id.trim().is_empty() => {
            errors.email_id = Some("Email is required.");
        }
        Err(_) => errors.email_id = Some("Enter a valid email address."),
    }

    if form.password.is_empty() {
        errors.password = Some("Password is required.");
    } else if form.password.len() < 6 {
        errors.password = Some("Password must be at least 6 characters.");
    }

    errors
}

/// Display the registration page.
pub async fn register_page() -> RegisterTemplate {
    RegisterTemplate {
        form: RegisterForm::default(),
        errors: FieldErrors::default(),
        submit_error: None,
    }
}

/// Handle a registration submission.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let errors = validate_registration(&form);
    if !errors.is_empty() {
        return RegisterTemplate {
            form,
            errors,
            submit_error: None,
        }
        .into_response();
    }

    let request = RegistrationRequest {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        address: form.address.trim().to_owned(),
        email_id: form.email_id.trim().to_owned(),
        password: form.password.clone(),
        user_id: form.user_id.trim().to_owned(),
    };

    match state.users().register(&request).await {
        Ok(()) => Redirect::to("/login?success=registered").into_response(),
        Err(err) => {
            let message = err.rejection_message().map_or_else(
                || {
                    tracing::warn!(error = %err, "Registration call failed");
                    "Unable to reach the registration service. Please try again.".to_owned()
                },
                String::from,
            );
            RegisterTemplate {
                form,
                errors: FieldErrors::default(),
                submit_error: Some(message),
            }
            .into_response()
        }
    }
}

/// Handle logout: drop the identity and the cart working copy.
pub async fn logout(session: Session) -> Redirect {
    if let Err(err) = clear_identity(&session).await {
        tracing::warn!(error = %err, "Failed to clear session on logout");
    }
    if let Err(err) = session.flush().await {
        tracing::warn!(error = %err, "Failed to flush session on logout");
    }
    clear_sentry_user();
    Redirect::to("/login?success=logged_out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_flags_every_field() {
        let errors = validate_registration(&RegisterForm::default());
        assert!(errors.first_name.is_some());
        assert!(errors.last_name.is_some());
        assert!(errors.address.is_some());
        assert!(errors.email_id.is_some());
        assert!(errors.password.is_some());
        assert!(errors.user_id.is_some());
    }

    #[test]
    fn valid_form_passes() {
        let form = RegisterForm {
            first_name: "Asha".to_owned(),
            last_name: "Rao".to_owned(),
            address: "12 MG Road".to_owned(),
            email_id: "asha@example.com".to_owned(),
            password: "secret1".to_owned(),
            user_id: "asha".to_owned(),
        };
        assert!(validate_registration(&form).is_empty());
    }

    #[test]
    fn malformed_email_gets_its_own_message() {
        let form = RegisterForm {
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            address: "C".to_owned(),
            email_id: "not-an-email".to_owned(),
            password: "secret1".to_owned(),
            user_id: "ab".to_owned(),
        };
        let errors = validate_registration(&form);
        assert_eq!(errors.email_id, Some("Enter a valid email address."));
        assert!(errors.password.is_none());
    }

    #[test]
    fn short_password_is_rejected() {
        let form = RegisterForm {
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            address: "C".to_owned(),
            email_id: "a@b.com".to_owned(),
            password: "abc".to_owned(),
            user_id: "ab".to_owned(),
        };
        let errors = validate_registration(&form);
        assert_eq!(
            errors.password,
            Some("Password must be at least 6 characters.")
        );
    }
}
