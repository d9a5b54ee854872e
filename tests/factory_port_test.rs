use cashier_charge::domain::ports::{ChargeStoreBox, ChargeStoreFactory};
use cashier_charge::domain::record::NewCharge;
use cashier_charge::infrastructure::in_memory::InMemoryChargeStore;

fn new_charge(user_id: u64) -> NewCharge {
    NewCharge {
        user_id,
        name: "Widget".to_string(),
        status: "succeeded".to_string(),
        processor_charge_id: format!("pi_{user_id}"),
    }
}

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: ChargeStoreFactory =
        Box::new(|| Box::new(InMemoryChargeStore::new()) as ChargeStoreBox);

    let store = factory();
    store.insert(new_charge(1)).await.unwrap();

    let retrieved = store.get(1).await.unwrap().unwrap();
    assert_eq!(retrieved.user_id, 1);

    // Each call yields an independent store
    let other = factory();
    assert!(other.get(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_factory_in_task() {
    let factory: ChargeStoreFactory =
        Box::new(|| Box::new(InMemoryChargeStore::new()) as ChargeStoreBox);

    let handle = tokio::spawn(async move {
        let store = factory();
        store.insert(new_charge(2)).await.unwrap();
        store.get_all_for_user(2).await.unwrap()
    });

    let retrieved = handle.await.unwrap();
    assert_eq!(retrieved.len(), 1);
    assert_eq!(retrieved[0].processor_charge_id, "pi_2");
}
