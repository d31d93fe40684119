//! Order status as reported by the order service.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The order service reports status as a free-form string ("Placed",
/// "Cancelled", ...). Known values are parsed case-insensitively; anything
/// else is preserved verbatim in `Other` so a new upstream status never
/// breaks the order history screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Placed,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Whether this order has been cancelled.
    ///
    /// Cancelled orders render a disabled cancel control.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Display label, canonical for known statuses.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Placed => "Placed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "placed" => Self::Placed,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.label().to_owned()
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_case_insensitively() {
        assert_eq!(OrderStatus::from("CANCELLED".to_owned()), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from("placed".to_owned()), OrderStatus::Placed);
    }

    #[test]
    fn preserves_unknown_statuses() {
        let status = OrderStatus::from("In Transit".to_owned());
        assert_eq!(status, OrderStatus::Other("In Transit".to_owned()));
        assert_eq!(status.label(), "In Transit");
        assert!(!status.is_cancelled());
    }

    #[test]
    fn only_cancelled_disables_cancel() {
        assert!(OrderStatus::Cancelled.is_cancelled());
        assert!(!OrderStatus::Placed.is_cancelled());
    }
}
