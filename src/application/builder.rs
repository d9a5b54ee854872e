use crate::domain::customer::{CustomerOptions, CustomerRef};
use crate::domain::discount::{Discount, DiscountPolicy};
use crate::domain::invoice::{Invoice, InvoiceOptions};
use crate::domain::money::{Amount, Currency, Quantity};
use crate::domain::payment::Payment;
use crate::domain::ports::{Billable, PaymentProcessor};
use crate::domain::request::{ChargeOptions, InvoiceItemParams, Metadata, PaymentIntentParams};
use crate::error::{ChargeError, Result};
use tracing::{debug, info, instrument, warn};

/// What a terminal charge action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeOutcome {
    /// Charged immediately through a payment intent.
    Payment(Payment),
    /// Added as an invoice item and invoiced through the owner.
    Invoice(Invoice),
}

/// Builds a one-off charge for a billable owner.
///
/// Configuration methods borrow the builder mutably so they can be chained; the terminal actions
/// ([`create`](Self::create), [`add`](Self::add) and the two path-specific variants) consume it so
/// a configured charge can only be submitted once.
pub struct ChargeBuilder<'a> {
    owner: &'a dyn Billable,
    processor: &'a dyn PaymentProcessor,
    name: String,
    amount: Amount,
    currency: Currency,
    quantity: Quantity,
    coupon: Option<Discount>,
    metadata: Option<Metadata>,
    invoicable: bool,
}

impl<'a> ChargeBuilder<'a> {
    /// Creates a builder charging `amount` minor units in the owner's preferred currency.
    pub fn new(
        owner: &'a dyn Billable,
        processor: &'a dyn PaymentProcessor,
        name: impl Into<String>,
        amount: i64,
    ) -> Result<Self> {
        Ok(Self {
            owner,
            processor,
            name: name.into(),
            amount: Amount::new(amount)?,
            currency: owner.preferred_currency(),
            quantity: Quantity::ONE,
            coupon: None,
            metadata: None,
            invoicable: false,
        })
    }

    pub fn with_invoice(&mut self, invoicable: bool) -> &mut Self {
        self.invoicable = invoicable;
        self
    }

    /// Fails when an attached amount-off coupon is denominated in another currency.
    pub fn currency(&mut self, currency: &str) -> Result<&mut Self> {
        let currency = Currency::new(currency)?;
        if let Some(discount) = &self.coupon {
            check_coupon_currency(discount, &currency)?;
        }
        self.currency = currency;
        Ok(self)
    }

    pub fn quantity(&mut self, quantity: u32) -> Result<&mut Self> {
        self.quantity = Quantity::new(quantity)?;
        Ok(self)
    }

    /// Resolves `code` on the processor and attaches it as the charge's discount.
    ///
    /// Fails without touching the builder when the code is unknown, the coupon is recurring or it
    /// takes a fixed amount off in a currency other than the charge's.
    pub async fn with_coupon(&mut self, code: &str) -> Result<&mut Self> {
        let raw = self
            .processor
            .retrieve_coupon(code)
            .await?
            .ok_or_else(|| ChargeError::InvalidCoupon(code.to_string()))?;
        let discount = Discount::try_from(raw)?;

        if !DiscountPolicy::is_eligible_for_charge(&discount) {
            warn!(
                "Rejected coupon {} with duration {:?} for a one-off charge",
                code, discount.duration
            );
            return Err(ChargeError::IneligibleCoupon(code.to_string()));
        }
        check_coupon_currency(&discount, &self.currency)?;

        debug!("Applying coupon {} to charge {:?}", code, self.name);
        self.coupon = Some(discount);
        Ok(self)
    }

    /// Replaces any previously attached metadata.
    pub fn with_metadata(&mut self, metadata: Metadata) -> &mut Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> i64 {
        self.amount.value()
    }

    pub fn currency_code(&self) -> &Currency {
        &self.currency
    }

    pub fn quantity_value(&self) -> u32 {
        self.quantity.value()
    }

    pub fn coupon(&self) -> Option<&Discount> {
        self.coupon.as_ref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn is_invoicable(&self) -> bool {
        self.invoicable
    }

    /// Per-unit amount after the attached discount.
    pub fn calculate_final_amount(&self) -> i64 {
        DiscountPolicy::calculate_final_amount(self.amount.value(), self.coupon.as_ref())
    }

    /// Submits the charge without a payment token.
    pub async fn add(self, options: ChargeOptions) -> Result<ChargeOutcome> {
        self.create(None, options).await
    }

    #[instrument(skip_all, fields(charge = %self.name, invoicable = self.invoicable))]
    pub async fn create(
        self,
        token: Option<&str>,
        options: ChargeOptions,
    ) -> Result<ChargeOutcome> {
        if self.invoicable {
            self.create_with_invoice(token, options)
                .await
                .map(ChargeOutcome::Invoice)
        } else {
            self.create_without_invoice(token, options)
                .await
                .map(ChargeOutcome::Payment)
        }
    }

    /// Charges `final amount * quantity` immediately through a payment intent.
    pub async fn create_without_invoice(
        self,
        token: Option<&str>,
        options: ChargeOptions,
    ) -> Result<Payment> {
        let unit_amount = self.calculate_final_amount();
        let quantity = self.quantity.value();
        let amount = unit_amount
            .checked_mul(i64::from(quantity))
            .ok_or(ChargeError::AmountOverflow {
                unit_amount,
                quantity,
            })?;
        let customer = self.resolve_customer(token).await?;

        let params = PaymentIntentParams {
            amount,
            currency: options.currency.unwrap_or(self.currency),
            confirmation_method: options.confirmation_method.unwrap_or_default(),
            confirm: options.confirm.unwrap_or(true),
            customer: customer.map(|c| c.id).or(options.customer),
            payment_method: options.payment_method,
            description: options.description,
            receipt_email: options.receipt_email,
            off_session: options.off_session,
            metadata: self.metadata,
        };

        if params.payment_method.is_none() && params.customer.is_none() {
            return Err(ChargeError::MissingPaymentMethod);
        }

        info!(
            "Creating payment intent for {} {} ({} x {})",
            params.amount,
            params.currency,
            unit_amount,
            quantity
        );
        let payment = Payment::new(self.processor.create_payment_intent(&params).await?);
        payment.validate()?;

        Ok(payment)
    }

    /// Adds the charge as an invoice item and invoices the owner.
    ///
    /// The unit amount is not multiplied by the quantity; the processor receives both.
    pub async fn create_with_invoice(
        self,
        token: Option<&str>,
        options: ChargeOptions,
    ) -> Result<Invoice> {
        let customer = self.resolve_customer(token).await?;
        let unit_amount = match options.unit_amount {
            Some(value) if value < 0 => {
                return Err(ChargeError::InvalidAmount {
                    field: "unit_amount",
                    value,
                });
            }
            Some(value) => value,
            None => self.calculate_final_amount(),
        };
        let quantity = match options.quantity {
            Some(value) => Quantity::new(value)?,
            None => self.quantity,
        };

        let params = InvoiceItemParams {
            customer: options
                .customer
                .or(customer.map(|c| c.id))
                .ok_or(ChargeError::MissingCustomer)?,
            unit_amount,
            quantity: quantity.value(),
            currency: options.currency.unwrap_or(self.currency),
            description: options.description.unwrap_or(self.name),
            metadata: self.metadata,
        };

        let item = self.processor.create_invoice_item(&params).await?;
        info!(
            "Created invoice item {} for customer {} ({} x {} {})",
            item.id, item.customer, item.unit_amount, item.quantity, item.currency
        );

        self.owner.invoice(InvoiceOptions::default()).await
    }

    async fn resolve_customer(&self, token: Option<&str>) -> Result<Option<CustomerRef>> {
        let customer = self
            .owner
            .create_or_get_customer(&CustomerOptions::default())
            .await?;

        if let Some(token) = token {
            self.owner.update_card(token).await?;
        }

        Ok(customer)
    }
}

fn check_coupon_currency(discount: &Discount, currency: &Currency) -> Result<()> {
    if DiscountPolicy::applies_to_currency(discount, currency) {
        return Ok(());
    }
    warn!(
        "Rejected coupon {} in {:?} for a {} charge",
        discount.id,
        discount.currency(),
        currency
    );
    Err(ChargeError::CouponCurrencyMismatch {
        code: discount.id.clone(),
        currency: currency.to_string(),
    })
}
