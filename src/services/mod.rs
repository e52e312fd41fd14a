pub mod listing;
pub mod purchase;
pub mod registration;
