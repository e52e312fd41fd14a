use super::types::{Card, Charge, ChargeRequest};
use crate::connectors::errors::PaymentError;
use crate::forms::{CardForm, CardUpdate};
use async_trait::async_trait;

/// Everything this system asks of the payment processor. Card operations are
/// keyed by the processor-side customer id stored on the user; none of them
/// carry local business logic.
#[async_trait]
pub trait PaymentConnector: Send + Sync {
    /// Provision a managed account able to receive marketplace payouts.
    async fn create_managed_account(&self, email: &str) -> Result<String, PaymentError>;

    /// Provision a customer record used to hold the user's cards.
    async fn create_customer(&self, email: &str, description: &str)
        -> Result<String, PaymentError>;

    async fn create_charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError>;

    /// Tokenize the raw card data and attach the token to the customer.
    async fn create_card(&self, customer_id: &str, card: &CardForm) -> Result<Card, PaymentError>;

    async fn update_card(
        &self,
        customer_id: &str,
        card_id: &str,
        update: &CardUpdate,
    ) -> Result<Card, PaymentError>;

    async fn get_card(&self, customer_id: &str, card_id: &str) -> Result<Card, PaymentError>;

    /// Returns whether the processor confirmed the deletion.
    async fn delete_card(&self, customer_id: &str, card_id: &str) -> Result<bool, PaymentError>;

    async fn list_cards(&self, customer_id: &str) -> Result<Vec<Card>, PaymentError>;
}
