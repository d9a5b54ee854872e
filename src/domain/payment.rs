use super::money::Currency;
use super::request::Metadata;
use crate::error::{ChargeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
        };
        f.write_str(status)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Succeeded,
    Pending,
    Failed,
}

/// A processor-side charge, the settled money movement behind a payment intent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub currency: Currency,
    pub status: ChargeStatus,
    pub paid: bool,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    pub amount: i64,
    pub currency: Currency,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub latest_charge: Option<Charge>,
}

/// The result of a direct (non-invoiced) charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    intent: PaymentIntent,
}

impl Payment {
    pub fn new(intent: PaymentIntent) -> Self {
        Self { intent }
    }

    pub fn id(&self) -> &str {
        &self.intent.id
    }

    pub fn status(&self) -> PaymentIntentStatus {
        self.intent.status
    }

    /// Amount actually submitted, in minor units.
    pub fn amount(&self) -> i64 {
        self.intent.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.intent.currency
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.intent.client_secret.as_deref()
    }

    pub fn charge(&self) -> Option<&Charge> {
        self.intent.latest_charge.as_ref()
    }

    pub fn is_succeeded(&self) -> bool {
        self.intent.status == PaymentIntentStatus::Succeeded
    }

    /// The customer must complete an extra step (e.g. 3D Secure) before funds move.
    pub fn requires_action(&self) -> bool {
        self.intent.status == PaymentIntentStatus::RequiresAction
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self.intent.status,
            PaymentIntentStatus::RequiresPaymentMethod | PaymentIntentStatus::Canceled
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_failed() {
            return Err(ChargeError::PaymentFailed {
                id: self.intent.id.clone(),
                status: self.intent.status.to_string(),
            });
        }
        Ok(())
    }

    pub fn as_processor_intent(&self) -> &PaymentIntent {
        &self.intent
    }
}
