mod json_error;
mod panic;
mod session;

pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;
pub use session::{CurrentUser, require_session};
