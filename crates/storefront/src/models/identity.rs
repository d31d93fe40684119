//! Session-stored identity.
//!
//! The identity record is written wholesale on every successful login,
//! removed on logout, and read back by the session guard on every request
//! to a protected route. A record that fails to decode is treated the same
//! as an absent one.

use serde::{Deserialize, Serialize};

use greenbasket_core::{Role, UserId};

/// The logged-in user, as persisted in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric ID assigned by the user service.
    pub user_id: UserId,
    /// Display name shown in the header.
    pub full_name: String,
    /// Role used for route access control.
    pub role: Role,
    /// Bearer token for the catalog and user services, when issued.
    pub token: Option<String>,
}

impl Identity {
    /// Token value for the Authorization header, if one was issued.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Session keys for per-visitor state.
pub mod session_keys {
    /// Key for the persisted [`Identity`](super::Identity) record.
    pub const IDENTITY: &str = "identity";

    /// Key for the working copy of the cart between renders.
    pub const WORKING_CART: &str = "working_cart";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips_with_integer_role() {
        let identity = Identity {
            user_id: UserId::new(7),
            full_name: "Asha Rao".to_owned(),
            role: Role::Seller,
            token: Some("tok-123".to_owned()),
        };

        let json = serde_json::to_value(&identity).unwrap();
        // The role is stored in its wire form so older records stay readable.
        assert_eq!(json["role"], 0);

        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }
}
