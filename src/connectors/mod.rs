pub mod errors;
pub mod payment;
