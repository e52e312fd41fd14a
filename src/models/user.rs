use crate::connectors::payment::{Card, PaymentConnector};
use crate::errors::AppError;
use crate::forms::{CardForm, CardUpdate};
use crate::models::product::Product;
use crate::models::record::{self, Record, RecordMeta};
use crate::store::{StoreClient, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullName {
    pub first: String,
    pub last: String,
}

/// Processor-side identity for a user: the managed account that receives
/// payouts and the customer record that holds their cards. Both stay empty
/// until lazily provisioned on first save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIdentity {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub customer_id: String,
}

impl PaymentIdentity {
    pub fn is_provisioned(&self) -> bool {
        !self.account_id.is_empty() && !self.customer_id.is_empty()
    }
}

/// A registered account. Email uniqueness is only enforced by a
/// query-before-insert at registration time; two concurrent registrations
/// with the same email can both land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password: String,
    pub name: FullName,
    #[serde(default)]
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub verified: bool,
    /// Ids of the products this user has posted, owned by id only; the
    /// product records themselves carry no back-reference constraint.
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub payment_identity: PaymentIdentity,
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

impl User {
    pub fn new(email: &str, password_hash: &str, name: FullName, contact: &str) -> Self {
        User {
            meta: RecordMeta::Draft,
            email: email.to_string(),
            password: password_hash.to_string(),
            name,
            contact: contact.to_string(),
            profile_image: None,
            verified: false,
            products: Vec::new(),
            payment_identity: PaymentIdentity::default(),
        }
    }

    pub async fn find_by_id<S: StoreClient>(store: &S, user_id: &str) -> Result<Self, AppError> {
        let path = format!("{}/{}", Self::COLLECTION, user_id);
        let value = store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("User doesn't exist".to_string()))?;
        Ok(Self::from_value(value)?)
    }

    /// First record whose email matches exactly. No case normalization:
    /// addresses differing only in case are distinct accounts.
    pub async fn find_by_email<S: StoreClient>(store: &S, email: &str) -> Result<Self, AppError> {
        let matches = store.query_equal(Self::COLLECTION, "email", email, 1).await?;
        for value in matches {
            if value.get("email").and_then(Value::as_str) == Some(email) {
                return Ok(Self::from_value(value)?);
            }
        }
        Err(AppError::NotFound(
            "This email is not registered.".to_string(),
        ))
    }

    /// Persist the user, provisioning their payment identity on the first
    /// save: managed account first, then customer, then both ids are written
    /// back in a follow-up update. If provisioning fails the user stays
    /// persisted without a payment identity; there is no rollback.
    pub async fn save<S, P>(&mut self, store: &S, payments: &P) -> Result<(), AppError>
    where
        S: StoreClient,
        P: PaymentConnector,
    {
        record::save(store, self).await?;

        if self.payment_identity.account_id.is_empty() {
            let account_id = payments.create_managed_account(&self.email).await?;
            let description = format!("Customer for user: {}", self.id().unwrap_or_default());
            let customer_id = payments.create_customer(&self.email, &description).await?;

            let identity = PaymentIdentity {
                account_id,
                customer_id,
            };
            let mut patch = Map::new();
            patch.insert(
                "paymentIdentity".to_string(),
                serde_json::to_value(&identity).map_err(StoreError::Serialize)?,
            );
            record::update(store, self, patch).await?;
            self.payment_identity = identity;
        }
        Ok(())
    }

    /// Replace the password after verifying the old one against the stored
    /// hash. A mismatch writes nothing.
    pub async fn update_password<S: StoreClient>(
        &mut self,
        store: &S,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !bcrypt::verify(old_password, &self.password).unwrap_or(false) {
            return Err(AppError::Auth);
        }
        let hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.password = hash;

        let mut patch = Map::new();
        patch.insert("password".to_string(), Value::from(self.password.clone()));
        record::update(store, self, patch).await?;
        Ok(())
    }

    pub async fn update_contact<S: StoreClient>(
        &mut self,
        store: &S,
        new_contact: &str,
    ) -> Result<(), AppError> {
        self.contact = new_contact.to_string();
        let mut patch = Map::new();
        patch.insert("contact".to_string(), Value::from(self.contact.clone()));
        record::update(store, self, patch).await?;
        Ok(())
    }

    pub async fn add_card<P: PaymentConnector>(
        &self,
        payments: &P,
        card: &CardForm,
    ) -> Result<Card, AppError> {
        Ok(payments
            .create_card(&self.payment_identity.customer_id, card)
            .await?)
    }

    pub async fn update_card<P: PaymentConnector>(
        &self,
        payments: &P,
        card_id: &str,
        update: &CardUpdate,
    ) -> Result<Card, AppError> {
        Ok(payments
            .update_card(&self.payment_identity.customer_id, card_id, update)
            .await?)
    }

    pub async fn get_card<P: PaymentConnector>(
        &self,
        payments: &P,
        card_id: &str,
    ) -> Result<Card, AppError> {
        Ok(payments
            .get_card(&self.payment_identity.customer_id, card_id)
            .await?)
    }

    pub async fn remove_card<P: PaymentConnector>(
        &self,
        payments: &P,
        card_id: &str,
    ) -> Result<bool, AppError> {
        Ok(payments
            .delete_card(&self.payment_identity.customer_id, card_id)
            .await?)
    }

    pub async fn list_cards<P: PaymentConnector>(&self, payments: &P) -> Result<Vec<Card>, AppError> {
        Ok(payments
            .list_cards(&self.payment_identity.customer_id)
            .await?)
    }

    /// Append a posted product id to the user's list and persist the list.
    pub async fn add_product<S: StoreClient>(
        &mut self,
        store: &S,
        product_id: &str,
    ) -> Result<(), AppError> {
        self.products.push(product_id.to_string());
        let mut patch = Map::new();
        patch.insert("products".to_string(), Value::from(self.products.clone()));
        record::update(store, self, patch).await?;
        Ok(())
    }

    /// Remove a posted product: the product record is deleted first, then the
    /// id is spliced out of the list and the list persisted. If the second
    /// step fails the user keeps a dangling reference to the deleted product.
    pub async fn remove_product<S: StoreClient>(
        &mut self,
        store: &S,
        product_id: &str,
    ) -> Result<(), AppError> {
        let index = self
            .products
            .iter()
            .position(|id| id == product_id)
            .ok_or_else(|| {
                AppError::NotFound("The user doesn't have this product.".to_string())
            })?;

        let product_path = format!("{}/{}", Product::COLLECTION, product_id);
        store.remove(&product_path).await?;

        self.products.remove(index);
        let mut patch = Map::new();
        patch.insert("products".to_string(), Value::from(self.products.clone()));
        record::update(store, self, patch).await?;
        Ok(())
    }
}
