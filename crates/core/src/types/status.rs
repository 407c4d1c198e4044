//! Tag enums carried on orders.

use serde::{Deserialize, Serialize};

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Visa, Mastercard, JCB or American Express.
    #[default]
    CreditCard,
    /// ATM or online bank transfer.
    Atm,
    /// Pay at a convenience store counter.
    ConvenienceStore,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => write!(f, "credit_card"),
            Self::Atm => write!(f, "atm"),
            Self::ConvenienceStore => write!(f, "convenience_store"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "atm" => Ok(Self::Atm),
            "convenience_store" => Ok(Self::ConvenienceStore),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// Orders created on the client always start as `Processing`; the other
/// values only ever come back from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    #[default]
    Processing,
    Shipped,
    Completed,
    Cancelled,
}
