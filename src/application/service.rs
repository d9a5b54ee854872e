use super::builder::{ChargeBuilder, ChargeOutcome};
use crate::domain::order::ChargeOrder;
use crate::domain::ports::{Billable, ChargeStoreBox, PaymentProcessor};
use crate::domain::record::{ChargeRecord, NewCharge};
use crate::domain::request::{ChargeOptions, Metadata};
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

/// Runs charge orders through a [`ChargeBuilder`] and records every successful charge.
pub struct ChargeService {
    processor: Arc<dyn PaymentProcessor>,
    charge_store: ChargeStoreBox,
}

impl ChargeService {
    pub fn new(processor: Arc<dyn PaymentProcessor>, charge_store: ChargeStoreBox) -> Self {
        Self {
            processor,
            charge_store,
        }
    }

    /// Charges `owner` for `order` and persists the resulting charge record.
    ///
    /// Nothing is recorded when configuration or submission fails.
    pub async fn process(&self, owner: &dyn Billable, order: ChargeOrder) -> Result<ChargeRecord> {
        let mut builder =
            ChargeBuilder::new(owner, self.processor.as_ref(), &order.name, order.amount)?;

        if let Some(quantity) = order.quantity {
            builder.quantity(quantity)?;
        }
        if let Some(currency) = order.currency.as_deref() {
            builder.currency(currency)?;
        }
        if let Some(coupon) = order.coupon.as_deref() {
            builder.with_coupon(coupon).await?;
        }
        builder
            .with_invoice(order.invoice.unwrap_or(false))
            .with_metadata(Metadata::from([(
                "user_id".to_string(),
                order.user.to_string(),
            )]));

        let options = ChargeOptions {
            payment_method: order.payment_method,
            ..ChargeOptions::default()
        };
        let (status, processor_charge_id) =
            match builder.create(order.token.as_deref(), options).await? {
                ChargeOutcome::Payment(payment) => {
                    (payment.status().to_string(), payment.id().to_string())
                }
                ChargeOutcome::Invoice(invoice) => {
                    (invoice.status.as_str().to_string(), invoice.id)
                }
            };

        let record = self
            .charge_store
            .insert(NewCharge {
                user_id: order.user,
                name: order.name,
                status,
                processor_charge_id,
            })
            .await?;
        info!(
            "Recorded charge {} for user {} ({})",
            record.id, record.user_id, record.status
        );
        Ok(record)
    }

    pub async fn charges_for_user(&self, user_id: u64) -> Result<Vec<ChargeRecord>> {
        self.charge_store.get_all_for_user(user_id).await
    }

    /// Consumes the service and returns every recorded charge.
    pub async fn into_records(self) -> Result<Vec<ChargeRecord>> {
        self.charge_store.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::{CouponDuration, RawCoupon};
    use crate::domain::money::Currency;
    use crate::error::ChargeError;
    use crate::infrastructure::in_memory::{
        InMemoryChargeStore, InMemoryOwner, InMemoryProcessor, PM_CARD_DECLINED, PM_CARD_VISA,
    };

    fn order(user: u64, amount: i64) -> ChargeOrder {
        ChargeOrder {
            user,
            name: "Widget".to_string(),
            amount,
            quantity: None,
            currency: None,
            coupon: None,
            invoice: None,
            payment_method: Some(PM_CARD_VISA.to_string()),
            token: None,
        }
    }

    fn service(processor: &InMemoryProcessor) -> ChargeService {
        ChargeService::new(
            Arc::new(processor.clone()),
            Box::new(InMemoryChargeStore::new()),
        )
    }

    #[tokio::test]
    async fn test_successful_charge_is_recorded() {
        let processor = InMemoryProcessor::new();
        let owner = InMemoryOwner::new(processor.clone(), Currency::new("usd").unwrap());
        let service = service(&processor);

        let record = service.process(&owner, order(1, 1999)).await.unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.user_id, 1);
        assert_eq!(record.status, "succeeded");
        assert!(record.processor_charge_id.starts_with("pi_"));

        let request = &processor.payment_intent_requests().await[0];
        assert_eq!(request.metadata.as_ref().unwrap()["user_id"], "1");

        assert_eq!(service.charges_for_user(1).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_invoiced_order_records_invoice() {
        let processor = InMemoryProcessor::new();
        let owner = InMemoryOwner::new(processor.clone(), Currency::new("usd").unwrap());
        let service = service(&processor);

        let invoiced = ChargeOrder {
            invoice: Some(true),
            quantity: Some(2),
            payment_method: None,
            token: Some(PM_CARD_VISA.to_string()),
            ..order(3, 1000)
        };
        let record = service.process(&owner, invoiced).await.unwrap();
        assert_eq!(record.status, "paid");
        assert!(record.processor_charge_id.starts_with("in_"));
    }

    #[tokio::test]
    async fn test_failed_charges_are_not_recorded() {
        let processor = InMemoryProcessor::with_coupons([RawCoupon {
            id: "MONTHLY".to_string(),
            name: None,
            amount_off: Some(100),
            percent_off: None,
            currency: None,
            duration: CouponDuration::Repeating,
            duration_in_months: Some(6),
            valid: true,
        }]);
        let owner = InMemoryOwner::new(processor.clone(), Currency::new("usd").unwrap());
        let service = service(&processor);

        let declined = ChargeOrder {
            payment_method: Some(PM_CARD_DECLINED.to_string()),
            ..order(1, 1000)
        };
        assert!(matches!(
            service.process(&owner, declined).await,
            Err(ChargeError::PaymentFailed { .. })
        ));

        let recurring = ChargeOrder {
            coupon: Some("MONTHLY".to_string()),
            ..order(1, 1000)
        };
        assert!(matches!(
            service.process(&owner, recurring).await,
            Err(ChargeError::IneligibleCoupon(_))
        ));

        assert!(service.into_records().await.unwrap().is_empty());
    }
}
