pub mod password;
pub mod token;
pub mod validate;

pub use password::{hash_password, verify_password};
pub use token::generate_token;
pub use validate::ValidatedJson;
