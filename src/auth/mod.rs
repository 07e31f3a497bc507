pub mod jwt;
pub mod password;
pub mod tokens;
mod types;

pub use tokens::{TokenService, TokenSettings};
pub use types::{AccessClaims, RefreshClaims, TokenClaims, TokenError, TokenPair};
