pub mod cookies;
mod entry;
pub mod multipart;
pub mod users;

pub use entry::{API_PREFIX, app, router};
