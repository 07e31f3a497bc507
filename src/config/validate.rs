use anyhow::{Result, bail};

use crate::media::MediaProviderId;

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let errors = collect_errors(cfg);
    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

fn collect_errors(cfg: &AppConfig) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.access_token_secret.trim().is_empty() {
            errors.push("auth.access_token_secret must not be empty".to_string());
        }

        if auth.refresh_token_secret.trim().is_empty() {
            errors.push("auth.refresh_token_secret must not be empty".to_string());
        }

        if !auth.access_token_secret.is_empty()
            && auth.access_token_secret == auth.refresh_token_secret
        {
            errors.push(
                "auth.access_token_secret and auth.refresh_token_secret must differ".to_string(),
            );
        }

        if auth.access_token_ttl_secs == 0 {
            errors.push("auth.access_token_ttl_secs must be > 0".to_string());
        }

        if auth.refresh_token_ttl_secs <= auth.access_token_ttl_secs {
            errors.push(
                "auth.refresh_token_ttl_secs must be greater than auth.access_token_ttl_secs"
                    .to_string(),
            );
        }
    }

    if cfg.media.public_base_url.trim().is_empty() {
        errors.push("media.public_base_url must not be empty".to_string());
    }

    if cfg.media.request_timeout_secs == 0 {
        errors.push("media.request_timeout_secs must be > 0".to_string());
    }

    if cfg.media.provider == MediaProviderId::Remote
        && cfg
            .media
            .remote_endpoint
            .as_deref()
            .is_none_or(|endpoint| endpoint.trim().is_empty())
    {
        errors.push("media.remote_endpoint is required for the remote provider".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::{
        config::{AppConfig, AuthConfig, DatabaseConfig},
        media::MediaProviderId,
    };

    fn auth(access: &str, refresh: &str) -> AuthConfig {
        AuthConfig {
            access_token_secret: access.to_string(),
            access_token_ttl_secs: 60,
            refresh_token_secret: refresh.to_string(),
            refresh_token_ttl_secs: 600,
        }
    }

    #[test]
    fn default_config_is_valid() {
        validate(&AppConfig::default()).expect("defaults should validate");
    }

    #[test]
    fn rejects_shared_token_secrets() {
        let cfg = AppConfig {
            auth: Some(auth("same", "same")),
            ..AppConfig::default()
        };

        let err = validate(&cfg).expect_err("shared secrets should fail");
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_refresh_ttl_not_longer_than_access_ttl() {
        let mut auth = auth("access", "refresh");
        auth.refresh_token_ttl_secs = auth.access_token_ttl_secs;
        let cfg = AppConfig {
            auth: Some(auth),
            ..AppConfig::default()
        };

        let err = validate(&cfg).expect_err("ttl ordering should fail");
        assert!(err.to_string().contains("refresh_token_ttl_secs"));
    }

    #[test]
    fn reports_every_problem_at_once() {
        let mut cfg = AppConfig {
            database: Some(DatabaseConfig {
                url: " ".to_string(),
                max_connections: 1,
                min_idle: 5,
            }),
            auth: Some(auth("", "refresh")),
            ..AppConfig::default()
        };
        cfg.media.provider = MediaProviderId::Remote;

        let message = validate(&cfg).expect_err("config should fail").to_string();
        assert!(message.contains("database.url"));
        assert!(message.contains("database.min_idle"));
        assert!(message.contains("auth.access_token_secret must not be empty"));
        assert!(message.contains("media.remote_endpoint"));
    }
}
