use super::customer::{CustomerOptions, CustomerRef};
use super::discount::RawCoupon;
use super::invoice::{Invoice, InvoiceItem, InvoiceOptions};
use super::money::Currency;
use super::payment::PaymentIntent;
use super::record::{ChargeRecord, NewCharge};
use super::request::{InvoiceItemParams, PaymentIntentParams};
use crate::error::{ProcessorError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// The account being charged.
#[async_trait]
pub trait Billable: Send + Sync {
    fn preferred_currency(&self) -> Currency;

    /// Returns `None` when the owner cannot be represented as a processor customer.
    async fn create_or_get_customer(
        &self,
        options: &CustomerOptions,
    ) -> Result<Option<CustomerRef>>;

    /// Attaches `token` as the customer's default payment method.
    async fn update_card(&self, token: &str) -> Result<()>;

    fn tax_percentage(&self) -> Option<Decimal>;

    /// Sweeps the customer's pending invoice items into a new invoice.
    async fn invoice(&self, options: InvoiceOptions) -> Result<Invoice>;
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn retrieve_coupon(&self, code: &str)
    -> std::result::Result<Option<RawCoupon>, ProcessorError>;

    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> std::result::Result<PaymentIntent, ProcessorError>;

    async fn create_invoice_item(
        &self,
        params: &InvoiceItemParams,
    ) -> std::result::Result<InvoiceItem, ProcessorError>;
}

#[async_trait]
pub trait ChargeStore: Send + Sync {
    async fn insert(&self, charge: NewCharge) -> Result<ChargeRecord>;
    async fn get(&self, id: u64) -> Result<Option<ChargeRecord>>;
    async fn get_all(&self) -> Result<Vec<ChargeRecord>>;
    async fn get_all_for_user(&self, user_id: u64) -> Result<Vec<ChargeRecord>>;
}

pub type ChargeStoreBox = Box<dyn ChargeStore>;
pub type ChargeStoreFactory = Box<dyn Fn() -> ChargeStoreBox + Send + Sync>;
