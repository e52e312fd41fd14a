mod common;

use campusmart::errors::AppError;
use campusmart::forms::{ListingForm, ListingUpdate};
use campusmart::models::record::Record;
use campusmart::models::Product;
use campusmart::services::listing;
use campusmart::store::StoreClient;
use serde_json::json;

fn macbook_form() -> ListingForm {
    ListingForm {
        title: "Macbook Pro 2015".to_string(),
        description: "Lightly used".to_string(),
        price: 999.0,
        image: None,
    }
}

#[tokio::test]
async fn posting_a_listing_tokenizes_the_title_into_tags() {
    let store = common::store();
    let payments = common::payments();
    let user = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;

    let product = listing::post_listing(&store, user.id().unwrap(), macbook_form())
        .await
        .unwrap();

    assert_eq!(product.tags, vec!["Macbook", "Pro", "2015"]);
    assert_eq!(product.seller_id, user.id().unwrap());
    assert!(product.meta.exists());
}

#[tokio::test]
async fn posting_a_listing_appends_it_to_the_sellers_list() {
    let store = common::store();
    let payments = common::payments();
    let user = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;

    let product = listing::post_listing(&store, user.id().unwrap(), macbook_form())
        .await
        .unwrap();

    let raw = store
        .get(&format!("users/{}", user.id().unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw["products"], json!([product.id().unwrap()]));
}

#[tokio::test]
async fn posting_for_an_unknown_user_is_not_found() {
    let store = common::store();
    let result = listing::post_listing(&store, "-Kghost", macbook_form()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn negative_prices_are_accepted_as_stored() {
    // nothing in the entity layer validates the price sign
    let store = common::store();
    let payments = common::payments();
    let user = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;
    let mut form = macbook_form();
    form.price = -5.0;

    let product = listing::post_listing(&store, user.id().unwrap(), form)
        .await
        .unwrap();
    assert_eq!(product.price, -5.0);
}

#[tokio::test]
async fn only_the_seller_can_update_a_listing() {
    let store = common::store();
    let payments = common::payments();
    let seller = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;
    let stranger = common::persisted_user(&store, &payments, "stranger@sjsu.edu").await;
    let product = listing::post_listing(&store, seller.id().unwrap(), macbook_form())
        .await
        .unwrap();

    let update = ListingUpdate {
        price: Some(500.0),
        ..ListingUpdate::default()
    };
    let result = listing::update_listing(
        &store,
        stranger.id().unwrap(),
        product.id().unwrap(),
        update,
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn updating_a_listing_merges_only_the_given_fields() {
    let store = common::store();
    let payments = common::payments();
    let seller = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;
    let product = listing::post_listing(&store, seller.id().unwrap(), macbook_form())
        .await
        .unwrap();

    let update = ListingUpdate {
        price: Some(500.0),
        ..ListingUpdate::default()
    };
    listing::update_listing(&store, seller.id().unwrap(), product.id().unwrap(), update)
        .await
        .unwrap();

    let stored = Product::find_by_id(&store, product.id().unwrap())
        .await
        .unwrap();
    assert_eq!(stored.price, 500.0);
    assert_eq!(stored.title, "Macbook Pro 2015");
}

#[tokio::test]
async fn removing_a_listing_goes_through_the_owners_product_list() {
    let store = common::store();
    let payments = common::payments();
    let seller = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;
    let product = listing::post_listing(&store, seller.id().unwrap(), macbook_form())
        .await
        .unwrap();
    let product_id = product.id().unwrap().to_string();

    listing::remove_listing(&store, seller.id().unwrap(), &product_id)
        .await
        .unwrap();

    assert!(store
        .get(&format!("products/{}", product_id))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn user_products_resolves_each_owned_id() {
    let store = common::store();
    let payments = common::payments();
    let seller = common::persisted_user(&store, &payments, "seller@sjsu.edu").await;
    listing::post_listing(&store, seller.id().unwrap(), macbook_form())
        .await
        .unwrap();
    let mut second = macbook_form();
    second.title = "Desk lamp".to_string();
    listing::post_listing(&store, seller.id().unwrap(), second)
        .await
        .unwrap();

    let user = campusmart::models::User::find_by_id(&store, seller.id().unwrap())
        .await
        .unwrap();
    let products = listing::user_products(&store, &user).await.unwrap();
    assert_eq!(products.len(), 2);
}
