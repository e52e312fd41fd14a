use super::connector::PaymentConnector;
use super::types::{Card, Charge, ChargeRequest};
use crate::connectors::errors::PaymentError;
use crate::forms::{CardForm, CardUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Deterministic in-memory processor used by the test suite: provisioning
/// hands out sequential ids, charges always succeed, cards live in a map.
/// Flip `fail_provisioning`/`fail_charges` to exercise the failure paths.
#[derive(Default)]
pub struct MockPayments {
    counter: AtomicUsize,
    cards: Mutex<HashMap<String, Vec<Card>>>,
    charges: Mutex<Vec<ChargeRequest>>,
    fail_provisioning: AtomicBool,
    fail_charges: AtomicBool,
}

impl MockPayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_provisioning(&self) {
        self.fail_provisioning.store(true, Ordering::SeqCst);
    }

    pub fn fail_charges(&self) {
        self.fail_charges.store(true, Ordering::SeqCst);
    }

    /// Charge requests seen so far, for assertions.
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().expect("charge log lock poisoned").clone()
    }

    fn next(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn rejected(&self, which: &AtomicBool) -> Result<(), PaymentError> {
        if which.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                status: 402,
                message: "mock processor rejection".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentConnector for MockPayments {
    async fn create_managed_account(&self, _email: &str) -> Result<String, PaymentError> {
        self.rejected(&self.fail_provisioning)?;
        Ok(format!("acct_test_{}", self.next()))
    }

    async fn create_customer(
        &self,
        _email: &str,
        _description: &str,
    ) -> Result<String, PaymentError> {
        self.rejected(&self.fail_provisioning)?;
        Ok(format!("cus_test_{}", self.next()))
    }

    async fn create_charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        self.rejected(&self.fail_charges)?;
        let charge = Charge {
            id: format!("ch_test_{}", self.next()),
            status: "succeeded".to_string(),
            amount: request.amount_cents,
        };
        self.charges
            .lock()
            .expect("charge log lock poisoned")
            .push(request);
        Ok(charge)
    }

    async fn create_card(&self, customer_id: &str, card: &CardForm) -> Result<Card, PaymentError> {
        let last4 = card
            .number
            .chars()
            .rev()
            .take(4)
            .collect::<String>()
            .chars()
            .rev()
            .collect();
        let card = Card {
            id: format!("card_{}", Uuid::new_v4().simple()),
            brand: "Visa".to_string(),
            last4,
            exp_month: card.exp_month.parse().unwrap_or(0),
            exp_year: card.exp_year.parse().unwrap_or(0),
        };
        self.cards
            .lock()
            .expect("card map lock poisoned")
            .entry(customer_id.to_string())
            .or_default()
            .push(card.clone());
        Ok(card)
    }

    async fn update_card(
        &self,
        customer_id: &str,
        card_id: &str,
        update: &CardUpdate,
    ) -> Result<Card, PaymentError> {
        let mut cards = self.cards.lock().expect("card map lock poisoned");
        let card = cards
            .get_mut(customer_id)
            .and_then(|list| list.iter_mut().find(|c| c.id == card_id))
            .ok_or(PaymentError::Api {
                status: 404,
                message: "no such card".to_string(),
            })?;
        if let Some(exp_month) = &update.exp_month {
            card.exp_month = exp_month.parse().unwrap_or(card.exp_month);
        }
        if let Some(exp_year) = &update.exp_year {
            card.exp_year = exp_year.parse().unwrap_or(card.exp_year);
        }
        Ok(card.clone())
    }

    async fn get_card(&self, customer_id: &str, card_id: &str) -> Result<Card, PaymentError> {
        self.cards
            .lock()
            .expect("card map lock poisoned")
            .get(customer_id)
            .and_then(|list| list.iter().find(|c| c.id == card_id))
            .cloned()
            .ok_or(PaymentError::Api {
                status: 404,
                message: "no such card".to_string(),
            })
    }

    async fn delete_card(&self, customer_id: &str, card_id: &str) -> Result<bool, PaymentError> {
        let mut cards = self.cards.lock().expect("card map lock poisoned");
        let list = cards.get_mut(customer_id).ok_or(PaymentError::Api {
            status: 404,
            message: "no such customer".to_string(),
        })?;
        let before = list.len();
        list.retain(|c| c.id != card_id);
        Ok(list.len() < before)
    }

    async fn list_cards(&self, customer_id: &str) -> Result<Vec<Card>, PaymentError> {
        Ok(self
            .cards
            .lock()
            .expect("card map lock poisoned")
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }
}
