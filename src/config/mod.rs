pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, CookieConfig, DatabaseConfig, GeneralConfig, LoggingConfig,
    MediaConfig,
};
pub use envconfig::EnvConfig;
