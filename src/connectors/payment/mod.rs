mod client;
mod connector;
mod mock;
mod types;

pub use client::StripeClient;
pub use connector::PaymentConnector;
pub use mock::MockPayments;
pub use types::{Card, Charge, ChargeRequest};
