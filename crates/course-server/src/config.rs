use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub storage_dir: PathBuf,
    pub public_url: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("COURSES_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("COURSES_JWT_SECRET is unset or still a placeholder.");
        }

        let port = match get("COURSES_PORT") {
            Some(v) => v.parse().with_context(|| format!("COURSES_PORT is not a port: {}", v))?,
            None => 3000,
        };

        Ok(Self {
            host: get("COURSES_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("COURSES_DB_PATH").unwrap_or_else(|| "courses.db".into()).into(),
            storage_dir: get("COURSES_STORAGE_DIR").unwrap_or_else(|| "./storage".into()).into(),
            public_url: get("COURSES_PUBLIC_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            jwt_secret,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
