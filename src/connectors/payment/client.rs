use super::connector::PaymentConnector;
use super::types::{Card, Charge, ChargeRequest};
use crate::configuration::StripeSettings;
use crate::connectors::errors::PaymentError;
use crate::forms::{CardForm, CardUpdate};
use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;

/// HTTP client for the Stripe API. Requests are form-encoded against
/// `{base}/v1/...` with the secret key as basic-auth user; the base URL is
/// injectable so tests can point it at a local mock server.
pub struct StripeClient {
    base_url: String,
    secret_key: String,
    http_client: reqwest::Client,
}

impl StripeClient {
    pub fn new(settings: &StripeSettings) -> Self {
        StripeClient {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, PaymentError> {
        let response = request.basic_auth(&self.secret_key, None::<&str>).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown processor error")
            .to_string();
        tracing::error!(code = status.as_u16(), message = %message, "payment request rejected");
        Err(PaymentError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn string_field(body: &Value, field: &str) -> Result<String, PaymentError> {
        body.get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PaymentError::InvalidResponse(body.to_string()))
    }

    fn parse<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, PaymentError> {
        serde_json::from_value(body.clone())
            .map_err(|_| PaymentError::InvalidResponse(body.to_string()))
    }
}

#[async_trait]
impl PaymentConnector for StripeClient {
    async fn create_managed_account(&self, email: &str) -> Result<String, PaymentError> {
        let span = tracing::info_span!("stripe_create_account", email = %email);
        let params = [
            ("managed", "true"),
            ("country", "US"),
            ("email", email),
        ];
        let body = self
            .send(self.http_client.post(self.url("accounts")).form(&params))
            .instrument(span)
            .await?;
        Self::string_field(&body, "id")
    }

    async fn create_customer(
        &self,
        email: &str,
        description: &str,
    ) -> Result<String, PaymentError> {
        let span = tracing::info_span!("stripe_create_customer", email = %email);
        let params = [
            ("account_balance", "0"),
            ("email", email),
            ("description", description),
        ];
        let body = self
            .send(self.http_client.post(self.url("customers")).form(&params))
            .instrument(span)
            .await?;
        Self::string_field(&body, "id")
    }

    async fn create_charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        let span = tracing::info_span!("stripe_create_charge", customer = %request.customer_id);
        let amount = request.amount_cents.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", request.currency.as_str()),
            ("customer", request.customer_id.as_str()),
            ("destination", request.destination_account_id.as_str()),
        ];
        let body = self
            .send(self.http_client.post(self.url("charges")).form(&params))
            .instrument(span)
            .await?;
        Self::parse(body)
    }

    async fn create_card(&self, customer_id: &str, card: &CardForm) -> Result<Card, PaymentError> {
        let span = tracing::info_span!("stripe_create_card", customer = %customer_id);

        async {
            let token_params = [
                ("card[number]", card.number.as_str()),
                ("card[exp_month]", card.exp_month.as_str()),
                ("card[exp_year]", card.exp_year.as_str()),
                ("card[cvc]", card.cvc.as_str()),
            ];
            let token = self
                .send(self.http_client.post(self.url("tokens")).form(&token_params))
                .await?;
            let token_id = Self::string_field(&token, "id")?;

            let attach_params = [("source", token_id.as_str())];
            let body = self
                .send(
                    self.http_client
                        .post(self.url(&format!("customers/{}/sources", customer_id)))
                        .form(&attach_params),
                )
                .await?;
            Self::parse(body)
        }
        .instrument(span)
        .await
    }

    async fn update_card(
        &self,
        customer_id: &str,
        card_id: &str,
        update: &CardUpdate,
    ) -> Result<Card, PaymentError> {
        let span = tracing::info_span!("stripe_update_card", customer = %customer_id, card = %card_id);
        let mut params = Vec::new();
        if let Some(exp_month) = &update.exp_month {
            params.push(("exp_month", exp_month.clone()));
        }
        if let Some(exp_year) = &update.exp_year {
            params.push(("exp_year", exp_year.clone()));
        }
        let body = self
            .send(
                self.http_client
                    .post(self.url(&format!("customers/{}/sources/{}", customer_id, card_id)))
                    .form(&params),
            )
            .instrument(span)
            .await?;
        Self::parse(body)
    }

    async fn get_card(&self, customer_id: &str, card_id: &str) -> Result<Card, PaymentError> {
        let span = tracing::info_span!("stripe_get_card", customer = %customer_id, card = %card_id);
        let body = self
            .send(
                self.http_client
                    .get(self.url(&format!("customers/{}/sources/{}", customer_id, card_id))),
            )
            .instrument(span)
            .await?;
        Self::parse(body)
    }

    async fn delete_card(&self, customer_id: &str, card_id: &str) -> Result<bool, PaymentError> {
        let span = tracing::info_span!("stripe_delete_card", customer = %customer_id, card = %card_id);
        let body = self
            .send(
                self.http_client
                    .delete(self.url(&format!("customers/{}/sources/{}", customer_id, card_id))),
            )
            .instrument(span)
            .await?;
        Ok(body.get("deleted").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn list_cards(&self, customer_id: &str) -> Result<Vec<Card>, PaymentError> {
        let span = tracing::info_span!("stripe_list_cards", customer = %customer_id);
        let body = self
            .send(
                self.http_client
                    .get(self.url(&format!("customers/{}/sources", customer_id)))
                    .query(&[("object", "card")]),
            )
            .instrument(span)
            .await?;
        match body.get("data") {
            Some(data) => Self::parse(data.clone()),
            None => Err(PaymentError::InvalidResponse(body.to_string())),
        }
    }
}
