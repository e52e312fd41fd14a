pub mod product;
pub mod record;
pub mod transaction;
pub mod user;

pub use product::*;
pub use record::*;
pub use transaction::*;
pub use user::*;
