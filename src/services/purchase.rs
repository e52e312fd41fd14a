use crate::connectors::payment::{ChargeRequest, PaymentConnector};
use crate::errors::AppError;
use crate::models::product::Product;
use crate::models::record;
use crate::models::transaction::{ProductSnapshot, Transaction};
use crate::models::user::User;
use crate::store::StoreClient;

/// Complete a purchase: charge the buyer's customer record for the listed
/// price with the seller's managed account as destination, then record the
/// transaction with a snapshot of the product as charged. The charge and the
/// transaction write are not atomic; a store failure after a successful
/// charge loses the history entry, not the money movement.
pub async fn purchase<S, P>(
    store: &S,
    payments: &P,
    buyer_id: &str,
    product_id: &str,
) -> Result<Transaction, AppError>
where
    S: StoreClient,
    P: PaymentConnector,
{
    let product = Product::find_by_id(store, product_id).await?;
    let buyer = User::find_by_id(store, buyer_id).await?;
    let seller = User::find_by_id(store, &product.seller_id).await?;

    let amount_cents = (product.price * 100.0).round() as i64;
    let charge = payments
        .create_charge(ChargeRequest {
            amount_cents,
            currency: "usd".to_string(),
            customer_id: buyer.payment_identity.customer_id.clone(),
            destination_account_id: seller.payment_identity.account_id.clone(),
        })
        .await?;

    tracing::info!(
        charge_id = %charge.id,
        status = %charge.status,
        amount = charge.amount,
        "charge created"
    );

    let snapshot = ProductSnapshot {
        id: product_id.to_string(),
        title: product.title.clone(),
        amount: charge.amount as f64,
    };
    let mut transaction = Transaction::new(
        &charge.id,
        &product.seller_id,
        buyer_id,
        snapshot,
        &charge.status,
    );
    record::save(store, &mut transaction).await?;
    Ok(transaction)
}

/// Record a transaction without involving the processor: no charge id and a
/// "pending" status, with the listed price as the snapshot amount.
pub async fn record_pending<S: StoreClient>(
    store: &S,
    buyer_id: &str,
    product_id: &str,
) -> Result<Transaction, AppError> {
    let product = Product::find_by_id(store, product_id).await?;
    let snapshot = ProductSnapshot {
        id: product_id.to_string(),
        title: product.title.clone(),
        amount: product.price,
    };
    let mut transaction = Transaction::new("", &product.seller_id, buyer_id, snapshot, "pending");
    record::save(store, &mut transaction).await?;
    Ok(transaction)
}
