//! Session guard: role-gated access to protected screens.
//!
//! Each protected route declares its permitted roles by choosing an
//! extractor. The guard reads the persisted [`Identity`] from the session
//! on every request (never cached), tests role membership by set inclusion,
//! and redirects to `/unauthorized` when the identity is absent,
//! undecodable, or carries a role outside the allowed set. It performs no
//! network calls and no storage writes.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use greenbasket_core::Role;

use crate::models::{Identity, session_keys};

/// Decide whether an identity's role is in the allowed set.
///
/// Membership is tested by inclusion, never truthiness: `Role::Seller`
/// carries the wire value 0 and is a valid, present role. A missing
/// identity denies by default.
#[must_use]
pub fn role_allowed(identity: Option<&Identity>, allowed: &[Role]) -> bool {
    identity.is_some_and(|identity| allowed.contains(&identity.role))
}

/// Rejection issued when the guard denies access.
///
/// The 303 redirect means back-navigation from the unauthorized screen
/// does not resubmit the denied request.
#[derive(Debug)]
pub struct GuardRejection;

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        Redirect::to("/unauthorized").into_response()
    }
}

/// Read the identity from the session, treating a malformed record the
/// same as an absent one.
async fn session_identity(parts: &mut Parts) -> Option<Identity> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<Identity>(session_keys::IDENTITY)
        .await
        .ok()
        .flatten()
}

async fn require_role(parts: &mut Parts, allowed: &[Role]) -> Result<Identity, GuardRejection> {
    let identity = session_identity(parts).await;
    if !role_allowed(identity.as_ref(), allowed) {
        return Err(GuardRejection);
    }
    identity.ok_or(GuardRejection)
}

/// Extractor that requires a logged-in buyer.
pub struct RequireBuyer(pub Identity);

impl<S> FromRequestParts<S> for RequireBuyer
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, &[Role::Buyer]).await.map(Self)
    }
}

/// Extractor that requires a logged-in seller.
pub struct RequireSeller(pub Identity);

impl<S> FromRequestParts<S> for RequireSeller
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, &[Role::Seller]).await.map(Self)
    }
}

/// Extractor that requires any logged-in user, buyer or seller.
pub struct RequireUser(pub Identity);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, &[Role::Buyer, Role::Seller])
            .await
            .map(Self)
    }
}

/// Overwrite the persisted identity wholesale (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_identity(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::IDENTITY, identity).await
}

/// Clear the persisted identity (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Identity>(session_keys::IDENTITY).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header::LOCATION};
    use greenbasket_core::UserId;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: UserId::new(1),
            full_name: "Test".to_owned(),
            role,
            token: None,
        }
    }

    #[test]
    fn seller_role_zero_is_valid_and_present() {
        let seller = identity(Role::Seller);
        assert!(role_allowed(Some(&seller), &[Role::Seller]));
        assert!(role_allowed(Some(&seller), &[Role::Buyer, Role::Seller]));
    }

    #[test]
    fn wrong_role_is_denied() {
        let buyer = identity(Role::Buyer);
        assert!(!role_allowed(Some(&buyer), &[Role::Seller]));

        let seller = identity(Role::Seller);
        assert!(!role_allowed(Some(&seller), &[Role::Buyer]));
    }

    #[test]
    fn absent_identity_is_denied_by_default() {
        // The `{}` / missing-key case: no identity means no role matches.
        assert!(!role_allowed(None, &[Role::Buyer]));
        assert!(!role_allowed(None, &[Role::Seller]));
        assert!(!role_allowed(None, &[Role::Buyer, Role::Seller]));
    }

    #[test]
    fn rejection_redirects_to_unauthorized() {
        let response = GuardRejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/unauthorized"
        );
    }
}
