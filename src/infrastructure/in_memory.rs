use crate::domain::customer::{CustomerOptions, CustomerRef};
use crate::domain::discount::RawCoupon;
use crate::domain::invoice::{Invoice, InvoiceItem, InvoiceOptions, InvoiceStatus};
use crate::domain::money::Currency;
use crate::domain::payment::{Charge, ChargeStatus, PaymentIntent, PaymentIntentStatus};
use crate::domain::ports::{Billable, ChargeStore, PaymentProcessor};
use crate::domain::record::{ChargeRecord, NewCharge};
use crate::domain::request::{InvoiceItemParams, PaymentIntentParams};
use crate::error::{ChargeError, ProcessorError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Payment method that is always declined by the sandbox.
pub const PM_CARD_DECLINED: &str = "pm_card_chargeDeclined";
/// Payment method that always asks for customer authentication.
pub const PM_CARD_AUTHENTICATION_REQUIRED: &str = "pm_card_authenticationRequired";
/// Payment method that always succeeds.
pub const PM_CARD_VISA: &str = "pm_card_visa";

#[derive(Default)]
struct ProcessorState {
    coupons: HashMap<String, RawCoupon>,
    customers: HashMap<String, CustomerRef>,
    pending_items: Vec<InvoiceItem>,
    invoices: Vec<Invoice>,
    payment_intent_requests: Vec<PaymentIntentParams>,
    invoice_item_requests: Vec<InvoiceItemParams>,
    next_failure: Option<ProcessorError>,
    sequence: u64,
}

impl ProcessorState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}_{:06}", self.sequence)
    }

    fn take_failure(&mut self) -> std::result::Result<(), ProcessorError> {
        match self.next_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn customer(&self, id: &str) -> std::result::Result<&CustomerRef, ProcessorError> {
        self.customers
            .get(id)
            .ok_or_else(|| missing_resource("customer", id))
    }
}

fn missing_resource(kind: &str, id: &str) -> ProcessorError {
    ProcessorError::Api {
        code: "resource_missing".to_string(),
        message: format!("No such {kind}: '{id}'"),
    }
}

/// A sandbox payment processor that keeps everything in memory.
///
/// Behaves like a processor running in test mode: well-known payment method ids decide whether a
/// payment intent succeeds, is declined or needs authentication. Every request is recorded so
/// callers can inspect exactly what was submitted. Clones share state.
#[derive(Default, Clone)]
pub struct InMemoryProcessor {
    state: Arc<RwLock<ProcessorState>>,
}

impl InMemoryProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor whose coupon catalogue is `coupons`.
    pub fn with_coupons(coupons: impl IntoIterator<Item = RawCoupon>) -> Self {
        let state = ProcessorState {
            coupons: coupons
                .into_iter()
                .map(|coupon| (coupon.id.clone(), coupon))
                .collect(),
            ..ProcessorState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn add_coupon(&self, coupon: RawCoupon) {
        let mut state = self.state.write().await;
        state.coupons.insert(coupon.id.clone(), coupon);
    }

    /// Makes the next processor call fail with `error`.
    pub async fn fail_next_request(&self, error: ProcessorError) {
        self.state.write().await.next_failure = Some(error);
    }

    pub async fn create_customer(
        &self,
        options: &CustomerOptions,
    ) -> std::result::Result<CustomerRef, ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let customer = CustomerRef {
            id: state.next_id("cus"),
            default_payment_method: None,
        };
        debug!(
            "Created sandbox customer {} ({:?})",
            customer.id, options.email
        );
        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    pub async fn get_customer(&self, id: &str) -> std::result::Result<CustomerRef, ProcessorError> {
        let state = self.state.read().await;
        state.customer(id).cloned()
    }

    pub async fn attach_payment_method(
        &self,
        customer_id: &str,
        payment_method: &str,
    ) -> std::result::Result<(), ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let customer = state
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| missing_resource("customer", customer_id))?;
        customer.default_payment_method = Some(payment_method.to_string());
        Ok(())
    }

    /// Sweeps the customer's pending invoice items into an invoice.
    ///
    /// Tax is `tax_percentage` of the subtotal, rounded half-up. The invoice is paid straight away
    /// when the customer has a default payment method and `auto_advance` is not disabled.
    pub async fn create_invoice(
        &self,
        customer_id: &str,
        tax_percentage: Option<Decimal>,
        options: &InvoiceOptions,
    ) -> std::result::Result<Invoice, ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        let can_pay = state.customer(customer_id)?.default_payment_method.is_some();

        let (lines, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending_items)
            .into_iter()
            .partition(|item| item.customer == customer_id);
        state.pending_items = remaining;

        let Some(currency) = lines.first().map(|item| item.currency.clone()) else {
            return Err(ProcessorError::Api {
                code: "invoice_no_customer_line_items".to_string(),
                message: format!("Nothing to invoice for customer '{customer_id}'"),
            });
        };

        let subtotal: i64 = lines.iter().map(|item| item.amount).sum();
        let tax = tax_percentage
            .map(|pct| {
                (Decimal::from(subtotal) * pct / Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        let status = match options.auto_advance {
            Some(false) => InvoiceStatus::Draft,
            _ if can_pay => InvoiceStatus::Paid,
            _ => InvoiceStatus::Open,
        };

        let invoice = Invoice {
            id: state.next_id("in"),
            customer: customer_id.to_string(),
            currency,
            status,
            subtotal,
            tax,
            total: subtotal + tax,
            lines,
        };
        state.invoices.push(invoice.clone());
        Ok(invoice)
    }

    pub async fn payment_intent_requests(&self) -> Vec<PaymentIntentParams> {
        self.state.read().await.payment_intent_requests.clone()
    }

    pub async fn invoice_item_requests(&self) -> Vec<InvoiceItemParams> {
        self.state.read().await.invoice_item_requests.clone()
    }

    pub async fn pending_invoice_items(&self) -> Vec<InvoiceItem> {
        self.state.read().await.pending_items.clone()
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.state.read().await.invoices.clone()
    }
}

fn simulate_status(payment_method: Option<&str>, confirm: bool) -> PaymentIntentStatus {
    match payment_method {
        None => PaymentIntentStatus::RequiresPaymentMethod,
        Some(PM_CARD_DECLINED) => PaymentIntentStatus::RequiresPaymentMethod,
        Some(_) if !confirm => PaymentIntentStatus::RequiresConfirmation,
        Some(PM_CARD_AUTHENTICATION_REQUIRED) => PaymentIntentStatus::RequiresAction,
        Some(_) => PaymentIntentStatus::Succeeded,
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryProcessor {
    async fn retrieve_coupon(
        &self,
        code: &str,
    ) -> std::result::Result<Option<RawCoupon>, ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        Ok(state.coupons.get(code).cloned())
    }

    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> std::result::Result<PaymentIntent, ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        state.payment_intent_requests.push(params.clone());

        let payment_method = match (&params.payment_method, &params.customer) {
            (Some(pm), _) => Some(pm.clone()),
            (None, Some(customer)) => state.customer(customer)?.default_payment_method.clone(),
            (None, None) => None,
        };
        let status = simulate_status(payment_method.as_deref(), params.confirm);

        let latest_charge = match status {
            PaymentIntentStatus::Succeeded => Some(Charge {
                id: state.next_id("ch"),
                amount: params.amount,
                currency: params.currency.clone(),
                status: ChargeStatus::Succeeded,
                paid: true,
                customer: params.customer.clone(),
                description: params.description.clone(),
                receipt_url: None,
                failure_message: None,
            }),
            PaymentIntentStatus::RequiresPaymentMethod if payment_method.is_some() => {
                Some(Charge {
                    id: state.next_id("ch"),
                    amount: params.amount,
                    currency: params.currency.clone(),
                    status: ChargeStatus::Failed,
                    paid: false,
                    customer: params.customer.clone(),
                    description: params.description.clone(),
                    receipt_url: None,
                    failure_message: Some("Your card was declined.".to_string()),
                })
            }
            _ => None,
        };

        let id = state.next_id("pi");
        Ok(PaymentIntent {
            client_secret: Some(format!("{id}_secret")),
            id,
            status,
            amount: params.amount,
            currency: params.currency.clone(),
            customer: params.customer.clone(),
            payment_method,
            metadata: params.metadata.clone(),
            latest_charge,
        })
    }

    async fn create_invoice_item(
        &self,
        params: &InvoiceItemParams,
    ) -> std::result::Result<InvoiceItem, ProcessorError> {
        let mut state = self.state.write().await;
        state.take_failure()?;
        state.customer(&params.customer)?;
        state.invoice_item_requests.push(params.clone());

        let amount = params
            .unit_amount
            .checked_mul(i64::from(params.quantity))
            .ok_or_else(|| ProcessorError::Api {
                code: "amount_too_large".to_string(),
                message: "Invoice item amount overflows".to_string(),
            })?;

        let item = InvoiceItem {
            id: state.next_id("ii"),
            customer: params.customer.clone(),
            unit_amount: params.unit_amount,
            quantity: params.quantity,
            amount,
            currency: params.currency.clone(),
            description: Some(params.description.clone()),
            metadata: params.metadata.clone(),
        };
        state.pending_items.push(item.clone());
        Ok(item)
    }
}

/// A billable account backed by an [`InMemoryProcessor`].
pub struct InMemoryOwner {
    processor: InMemoryProcessor,
    currency: Currency,
    email: Option<String>,
    tax_percentage: Option<Decimal>,
    can_create_customer: bool,
    customer_id: RwLock<Option<String>>,
}

impl InMemoryOwner {
    pub fn new(processor: InMemoryProcessor, currency: Currency) -> Self {
        Self {
            processor,
            currency,
            email: None,
            tax_percentage: None,
            can_create_customer: true,
            customer_id: RwLock::new(None),
        }
    }

    /// An owner that has no processor customer and may not create one.
    pub fn guest(processor: InMemoryProcessor, currency: Currency) -> Self {
        Self {
            can_create_customer: false,
            ..Self::new(processor, currency)
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tax_percentage(mut self, tax_percentage: Decimal) -> Self {
        self.tax_percentage = Some(tax_percentage);
        self
    }

    pub async fn customer_id(&self) -> Option<String> {
        self.customer_id.read().await.clone()
    }

    async fn require_customer(&self) -> Result<CustomerRef> {
        self.create_or_get_customer(&CustomerOptions::default())
            .await?
            .ok_or(ChargeError::MissingCustomer)
    }
}

#[async_trait]
impl Billable for InMemoryOwner {
    fn preferred_currency(&self) -> Currency {
        self.currency.clone()
    }

    async fn create_or_get_customer(
        &self,
        options: &CustomerOptions,
    ) -> Result<Option<CustomerRef>> {
        let mut customer_id = self.customer_id.write().await;
        if let Some(id) = customer_id.as_deref() {
            return Ok(Some(self.processor.get_customer(id).await?));
        }
        if !self.can_create_customer {
            return Ok(None);
        }

        let options = CustomerOptions {
            email: options.email.clone().or_else(|| self.email.clone()),
            name: options.name.clone(),
        };
        let customer = self.processor.create_customer(&options).await?;
        *customer_id = Some(customer.id.clone());
        Ok(Some(customer))
    }

    async fn update_card(&self, token: &str) -> Result<()> {
        let customer = self.require_customer().await?;
        self.processor
            .attach_payment_method(&customer.id, token)
            .await?;
        Ok(())
    }

    fn tax_percentage(&self) -> Option<Decimal> {
        self.tax_percentage
    }

    async fn invoice(&self, options: InvoiceOptions) -> Result<Invoice> {
        let customer = self.require_customer().await?;
        Ok(self
            .processor
            .create_invoice(&customer.id, self.tax_percentage(), &options)
            .await?)
    }
}

/// A thread-safe in-memory store for charge records.
///
/// Ids are assigned sequentially starting at 1.
#[derive(Default, Clone)]
pub struct InMemoryChargeStore {
    charges: Arc<RwLock<BTreeMap<u64, ChargeRecord>>>,
}

impl InMemoryChargeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChargeStore for InMemoryChargeStore {
    async fn insert(&self, charge: NewCharge) -> Result<ChargeRecord> {
        let mut charges = self.charges.write().await;
        let id = charges.keys().next_back().map_or(1, |last| last + 1);
        let record = charge.into_record(id, Utc::now());
        charges.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<Option<ChargeRecord>> {
        let charges = self.charges.read().await;
        Ok(charges.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ChargeRecord>> {
        let charges = self.charges.read().await;
        Ok(charges.values().cloned().collect())
    }

    async fn get_all_for_user(&self, user_id: u64) -> Result<Vec<ChargeRecord>> {
        let charges = self.charges.read().await;
        Ok(charges
            .values()
            .filter(|charge| charge.user_id == user_id)
            .cloned()
            .collect())
    }
}
