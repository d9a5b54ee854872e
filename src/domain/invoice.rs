use super::money::Currency;
use super::request::Metadata;
use serde::{Deserialize, Serialize};

/// A pending line waiting to be swept into the customer's next invoice.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InvoiceItem {
    pub id: String,
    pub customer: String,
    pub unit_amount: i64,
    pub quantity: u32,
    /// `unit_amount * quantity`, as computed by the processor.
    pub amount: i64,
    pub currency: Currency,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Open,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Invoice {
    pub id: String,
    pub customer: String,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub subtotal: i64,
    #[serde(default)]
    pub tax: i64,
    pub total: i64,
    #[serde(default)]
    pub lines: Vec<InvoiceItem>,
}

/// Options forwarded to the owner's invoicing call.
#[derive(Debug, Default, Serialize, Clone, PartialEq)]
pub struct InvoiceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_advance: Option<bool>,
}
