//! Profile screen: view and update the logged-in user's details.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use greenbasket_core::UserId;

use crate::error::Result;
use crate::middleware::{RequireUser, set_identity};
use crate::services::users::UserProfile;
use crate::state::AppState;

use super::IdentityView;

/// Profile fields as the screen renders them.
pub struct ProfileView {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email_id: String,
}

impl From<UserProfile> for ProfileView {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id.as_i64(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            address: profile.address,
            email_id: profile.email_id.unwrap_or_default(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub identity: IdentityView,
    pub profile: ProfileView,
    pub editing: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(default)]
    pub edit: Option<String>,
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Display a profile. Users only ever see their own; any other ID is
/// treated as a guard failure.
pub async fn show(
    RequireUser(identity): RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let user_id = UserId::new(user_id);
    if user_id != identity.user_id {
        return Ok(Redirect::to("/unauthorized").into_response());
    }

    let profile = state.users().get_profile(user_id, identity.bearer()).await?;

    let notice = query
        .success
        .is_some()
        .then(|| "Profile updated successfully.".to_owned());
    let error = query.error.as_deref().and_then(|code| match code {
        "invalid" => Some("All fields are required.".to_owned()),
        "update" => Some("Failed to update your profile. Please try again.".to_owned()),
        _ => None,
    });

    Ok(ProfileTemplate {
        identity: IdentityView::from(&identity),
        profile: ProfileView::from(profile),
        editing: query.edit.is_some(),
        notice,
        error,
    }
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
}

/// Handle a profile update, refreshing the session's display name on
/// success.
pub async fn update(
    RequireUser(identity): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    let profile_path = format!("/profile/{}", identity.user_id);

    if form.first_name.trim().is_empty()
        || form.last_name.trim().is_empty()
        || form.address.trim().is_empty()
    {
        return Ok(Redirect::to(&format!("{profile_path}?edit=1&error=invalid")));
    }

    let request = UserProfile {
        user_id: identity.user_id,
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        address: form.address.trim().to_owned(),
        email_id: None,
    };

    match state.users().update_profile(&request, identity.bearer()).await {
        Ok(stored) => {
            let mut refreshed = identity;
            refreshed.full_name = format!("{} {}", stored.first_name, stored.last_name);
            set_identity(&session, &refreshed).await?;
            tracing::info!(user_id = %refreshed.user_id, "Profile updated");
            Ok(Redirect::to(&format!("{profile_path}?success=1")))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Profile update failed");
            Ok(Redirect::to(&format!("{profile_path}?edit=1&error=update")))
        }
    }
}
