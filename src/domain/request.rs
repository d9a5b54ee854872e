use super::money::Currency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationMethod {
    #[default]
    Automatic,
    Manual,
}

/// Caller-supplied overrides for a charge.
///
/// Every populated field takes precedence over the builder's defaults. Fields that only make sense
/// for one request shape are ignored by the other.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct ChargeOptions {
    pub payment_method: Option<String>,
    pub customer: Option<String>,
    pub currency: Option<Currency>,
    pub description: Option<String>,
    // payment intent only
    pub confirmation_method: Option<ConfirmationMethod>,
    pub confirm: Option<bool>,
    pub receipt_email: Option<String>,
    pub off_session: Option<bool>,
    // invoice item only
    pub unit_amount: Option<i64>,
    pub quantity: Option<u32>,
}

impl ChargeOptions {
    pub fn with_payment_method(payment_method: impl Into<String>) -> Self {
        Self {
            payment_method: Some(payment_method.into()),
            ..Self::default()
        }
    }
}

/// Payment intent creation request.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PaymentIntentParams {
    pub amount: i64,
    pub currency: Currency,
    pub confirmation_method: ConfirmationMethod,
    pub confirm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Invoice item creation request.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InvoiceItemParams {
    pub customer: String,
    pub unit_amount: i64,
    pub quantity: u32,
    pub currency: Currency,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
