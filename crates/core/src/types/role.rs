//! Identity roles used for route access control.

use serde::{Deserialize, Serialize};

/// Error converting a raw role value into a [`Role`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role value: {0}")]
pub struct RoleError(pub i64);

/// Role tag on an identity record.
///
/// The user service encodes roles as integers: 0 for sellers (who manage
/// the product catalog) and 1 for buyers. The integer form is preserved on
/// the wire via `try_from`/`into`, so an out-of-range value fails
/// deserialization instead of silently mapping to a default.
///
/// Note that `Seller` is the zero value: role checks must test membership,
/// never truthiness of the raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    /// Seller / administrator (wire value 0).
    Seller,
    /// Buyer (wire value 1).
    Buyer,
}

impl Role {
    /// The wire representation used by the user service.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Seller => 0,
            Self::Buyer => 1,
        }
    }

    /// Human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seller => "Seller",
            Self::Buyer => "Buyer",
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = RoleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Seller),
            1 => Ok(Self::Buyer),
            other => Err(RoleError(other)),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.as_i64()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seller_is_the_zero_value() {
        // Role 0 is a valid, present role - not "missing".
        assert_eq!(Role::try_from(0).unwrap(), Role::Seller);
        assert_eq!(serde_json::from_str::<Role>("0").unwrap(), Role::Seller);
    }

    #[test]
    fn buyer_round_trips_through_json() {
        let json = serde_json::to_string(&Role::Buyer).unwrap();
        assert_eq!(json, "1");
        assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), Role::Buyer);
    }

    #[test]
    fn unknown_role_value_is_rejected() {
        assert!(Role::try_from(2).is_err());
        assert!(serde_json::from_str::<Role>("7").is_err());
    }
}
