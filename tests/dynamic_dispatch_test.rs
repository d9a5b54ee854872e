use cashier_charge::application::builder::{ChargeBuilder, ChargeOutcome};
use cashier_charge::domain::discount::{CouponDuration, RawCoupon};
use cashier_charge::domain::money::Currency;
use cashier_charge::domain::ports::{Billable, ChargeStoreBox, PaymentProcessor};
use cashier_charge::domain::record::NewCharge;
use cashier_charge::domain::request::ChargeOptions;
use cashier_charge::infrastructure::in_memory::{
    InMemoryChargeStore, InMemoryOwner, InMemoryProcessor, PM_CARD_VISA,
};
use std::sync::Arc;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let sandbox = InMemoryProcessor::with_coupons([RawCoupon {
        id: "TENNER".to_string(),
        name: Some("Ten off".to_string()),
        amount_off: Some(1000),
        percent_off: None,
        currency: None,
        duration: CouponDuration::Once,
        duration_in_months: None,
        valid: true,
    }]);
    let processor: Arc<dyn PaymentProcessor> = Arc::new(sandbox.clone());
    let owner: Arc<dyn Billable> =
        Arc::new(InMemoryOwner::new(sandbox, Currency::new("gbp").unwrap()));

    // Verify Send + Sync by running the whole charge on a spawned task
    let handle = tokio::spawn(async move {
        let mut builder =
            ChargeBuilder::new(owner.as_ref(), processor.as_ref(), "Consultation", 5000)?;
        builder.with_coupon("TENNER").await?;
        builder
            .add(ChargeOptions::with_payment_method(PM_CARD_VISA))
            .await
    });

    let outcome = handle.await.unwrap().unwrap();
    let ChargeOutcome::Payment(payment) = outcome else {
        panic!("expected a payment");
    };
    assert_eq!(payment.amount(), 4000);
    assert_eq!(payment.currency().as_str(), "gbp");
}

#[tokio::test]
async fn test_charge_store_as_trait_object() {
    let store: ChargeStoreBox = Box::new(InMemoryChargeStore::new());

    let handle = tokio::spawn(async move {
        store
            .insert(NewCharge {
                user_id: 5,
                name: "Widget".to_string(),
                status: "succeeded".to_string(),
                processor_charge_id: "pi_5".to_string(),
            })
            .await
            .unwrap();
        store.get(1).await.unwrap().unwrap()
    });

    let record = handle.await.unwrap();
    assert_eq!(record.user_id, 5);
    assert_eq!(record.processor_charge_id, "pi_5");
}
