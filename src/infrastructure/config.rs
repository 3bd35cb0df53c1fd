use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Selects the default database file; `default` uses `loans.db`
    pub profile: String,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let profile = var("PROFILE").unwrap_or_else(|| "default".to_string());

        let database_url = var("DATABASE_URL").unwrap_or_else(|| {
            if profile == "default" {
                "sqlite://loans.db?mode=rwc".to_string()
            } else {
                format!("sqlite://loans_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            profile,
            seed_demo: var("SEED_DEMO").is_some(),
        }
    }
}
