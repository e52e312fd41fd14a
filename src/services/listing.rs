use crate::errors::AppError;
use crate::forms::{ListingForm, ListingUpdate};
use crate::models::product::Product;
use crate::models::record::{self, Record};
use crate::models::user::User;
use crate::store::StoreClient;
use serde_valid::Validate;

/// Post a listing for a user. Tags default to the whitespace-tokenized title.
/// The product save and the user's list update are two independent writes; a
/// failure on the second leaves the listing saved but unowned.
pub async fn post_listing<S: StoreClient>(
    store: &S,
    user_id: &str,
    form: ListingForm,
) -> Result<Product, AppError> {
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = User::find_by_id(store, user_id).await?;

    let tags = form.title.split_whitespace().map(str::to_string).collect();
    let mut product = Product::new(
        user_id,
        form.image.unwrap_or_default(),
        form.title,
        form.description,
        form.price,
        tags,
    );
    record::save(store, &mut product).await?;

    let product_id = product.id().unwrap_or_default().to_string();
    user.add_product(store, &product_id).await?;

    tracing::info!(product_id = %product_id, seller_id = %user_id, "listing posted");
    Ok(product)
}

/// Partial update of a listing, rejected when the caller is not the seller.
pub async fn update_listing<S: StoreClient>(
    store: &S,
    user_id: &str,
    product_id: &str,
    update: ListingUpdate,
) -> Result<(), AppError> {
    let product = Product::find_by_id(store, product_id).await?;
    if product.seller_id != user_id {
        return Err(AppError::Validation(
            "This product does not belong to the user.".to_string(),
        ));
    }
    record::update(store, &product, update.into_patch()).await?;
    Ok(())
}

/// Take a listing down via the owning user's product list.
pub async fn remove_listing<S: StoreClient>(
    store: &S,
    user_id: &str,
    product_id: &str,
) -> Result<(), AppError> {
    let mut user = User::find_by_id(store, user_id).await?;
    user.remove_product(store, product_id).await
}

/// Resolve each of the user's owned product ids to the full record.
pub async fn user_products<S: StoreClient>(
    store: &S,
    user: &User,
) -> Result<Vec<Product>, AppError> {
    let mut products = Vec::with_capacity(user.products.len());
    for product_id in &user.products {
        products.push(Product::find_by_id(store, product_id).await?);
    }
    Ok(products)
}
