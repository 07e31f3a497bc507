pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 10 * 24 * 60 * 60;

pub const DEFAULT_MEDIA_STAGING_DIR: &str = "./public/temp";
pub const DEFAULT_MEDIA_PUBLIC_DIR: &str = "./public/media";
pub const DEFAULT_MEDIA_PUBLIC_BASE_URL: &str = "/media";
pub const DEFAULT_MEDIA_REQUEST_TIMEOUT_SECS: i64 = 30;

pub const DEFAULT_COOKIE_SECURE: bool = true;
