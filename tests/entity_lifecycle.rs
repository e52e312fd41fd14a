mod common;

use campusmart::models::record::{self, Record};
use campusmart::models::transaction::{ProductSnapshot, Transaction};
use campusmart::models::Product;
use campusmart::store::{StoreClient, StoreError};
use serde_json::{json, Map, Value};

fn sample_product() -> Product {
    Product::new(
        "seller-1",
        String::new(),
        "Macbook Pro".to_string(),
        "Lightly used, charger included".to_string(),
        999.0,
        vec!["Macbook".to_string(), "Pro".to_string()],
    )
}

#[tokio::test]
async fn drafts_do_not_exist_until_saved() {
    let store = common::store();
    let mut product = sample_product();

    assert!(product.meta.is_draft());
    assert!(product.id().is_none());
    assert!(product.meta.created_at().is_none());

    record::save(&store, &mut product).await.unwrap();

    assert!(product.meta.exists());
    assert!(product.id().is_some());
    assert_eq!(
        product.meta.created_at().unwrap(),
        product.meta.updated_at().unwrap()
    );
}

#[tokio::test]
async fn first_save_writes_the_full_snapshot_at_the_bound_location() {
    let store = common::store();
    let mut product = sample_product();
    record::save(&store, &mut product).await.unwrap();

    let id = product.id().unwrap().to_string();
    let raw = store
        .get(&format!("products/{}", id))
        .await
        .unwrap()
        .expect("record missing from store");
    assert_eq!(raw["exists"], json!(true));
    assert_eq!(raw["id"], json!(id));
    assert_eq!(raw["title"], json!("Macbook Pro"));
    assert_eq!(raw["price"], json!(999.0));
    assert_eq!(raw["sellerId"], json!("seller-1"));
}

#[tokio::test]
async fn resaving_bumps_updated_at_but_never_created_at() {
    let store = common::store();
    let mut product = sample_product();
    record::save(&store, &mut product).await.unwrap();
    let created = product.meta.created_at().unwrap();
    let first_update = product.meta.updated_at().unwrap();

    product.price = 899.0;
    record::save(&store, &mut product).await.unwrap();

    assert_eq!(product.meta.created_at().unwrap(), created);
    assert!(product.meta.updated_at().unwrap() >= first_update);
}

#[tokio::test]
async fn partial_update_touches_only_the_named_fields_and_the_stamp() {
    let store = common::store();
    let mut product = sample_product();
    record::save(&store, &mut product).await.unwrap();
    let path = product.path().unwrap();
    let before = store.get(&path).await.unwrap().unwrap();

    let mut patch = Map::new();
    patch.insert("price".to_string(), json!(42.0));
    record::update(&store, &product, patch).await.unwrap();

    let after = store.get(&path).await.unwrap().unwrap();
    assert_eq!(after["price"], json!(42.0));
    assert_eq!(after["title"], before["title"]);
    assert_eq!(after["description"], before["description"]);
    assert_eq!(after["createdAt"], before["createdAt"]);
    assert_ne!(after["updatedAt"], Value::Null);
}

#[tokio::test]
async fn updating_a_draft_fails_with_unbound() {
    let store = common::store();
    let product = sample_product();
    let result = record::update(&store, &product, Map::new()).await;
    assert!(matches!(result, Err(StoreError::Unbound)));
}

#[tokio::test]
async fn delete_consumes_the_record_and_removes_it() {
    let store = common::store();
    let mut product = sample_product();
    record::save(&store, &mut product).await.unwrap();
    let path = product.path().unwrap();

    record::delete(&store, product).await.unwrap();
    assert!(store.get(&path).await.unwrap().is_none());
}

#[tokio::test]
async fn a_failed_write_propagates_the_store_error_unchanged() {
    let store = common::store();
    store.fail_writes_matching("products/");
    let mut product = sample_product();

    let result = record::save(&store, &mut product).await;
    assert!(matches!(result, Err(StoreError::Status { code: 500, .. })));
    // the in-memory handle is already bound by the time the write fails
    assert!(product.meta.exists());
}

#[tokio::test]
async fn product_round_trips_through_its_serialized_form() {
    let store = common::store();
    let mut product = sample_product();
    record::save(&store, &mut product).await.unwrap();

    let data = product.serialized_data().unwrap();
    let back = Product::from_value(Value::Object(data)).unwrap();
    assert_eq!(back, product);
}

#[tokio::test]
async fn user_round_trips_through_its_serialized_form() {
    let store = common::store();
    let payments = common::payments();
    let mut user = common::persisted_user(&store, &payments, "round@sjsu.edu").await;
    user.profile_image = Some("images/round.png".to_string());
    record::save(&store, &mut user).await.unwrap();

    let data = user.serialized_data().unwrap();
    let back = campusmart::models::User::from_value(Value::Object(data)).unwrap();
    assert_eq!(back, user);
}

#[tokio::test]
async fn transaction_round_trips_through_its_serialized_form() {
    let store = common::store();
    let mut transaction = Transaction::new(
        "ch_123",
        "seller-1",
        "buyer-1",
        ProductSnapshot {
            id: "-Kprod".to_string(),
            title: "Macbook Pro".to_string(),
            amount: 99900.0,
        },
        "succeeded",
    );
    record::save(&store, &mut transaction).await.unwrap();

    let data = transaction.serialized_data().unwrap();
    let back = Transaction::from_value(Value::Object(data)).unwrap();
    assert_eq!(back, transaction);
}

#[tokio::test]
async fn serialized_meta_comes_before_entity_fields_in_the_flat_mapping() {
    // the route contract is one flat object: shared fields plus the entity's own
    let product = sample_product();
    let data = product.serialized_data().unwrap();
    assert_eq!(data["exists"], json!(false));
    assert!(data.contains_key("title"));
    assert!(!data.contains_key("meta"));
}
