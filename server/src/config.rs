use anyhow::{Context, Result};
use platform_db::DatabaseSettings;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub public_base_url: String,
    pub hypermedia: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let database = DatabaseSettings::from_env().context("invalid database settings")?;
        Ok(Self::from_lookup(database, |key| std::env::var(key).ok()))
    }

    fn from_lookup(database: DatabaseSettings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();

        let hypermedia = lookup("HYPERMEDIA")
            .map(|val| !matches!(val.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Self {
            database,
            public_base_url,
            hypermedia,
            cors_allowed_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(DatabaseSettings::default(), |key| {
            map.get(key).map(|v| v.to_string())
        })
    }

    #[test]
    fn defaults() {
        let config = load(&[]);
        assert_eq!(config.public_base_url, "");
        assert!(config.hypermedia);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn parses_overrides() {
        let config = load(&[
            ("PUBLIC_BASE_URL", "https://hr.example.com/"),
            ("HYPERMEDIA", "off"),
            ("CORS_ALLOWED_ORIGINS", "https://a.test, ,https://b.test"),
        ]);
        assert_eq!(config.public_base_url, "https://hr.example.com");
        assert!(!config.hypermedia);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.test", "https://b.test"]
        );
    }
}
