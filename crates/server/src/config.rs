use std::{collections::HashMap, path::Path};

use admin_crud::{naming::DEFAULT_ROUTE_PREFIX, DEFAULT_CSRF_SECRET};
use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub route_prefix: String,
    pub csrf_secret: String,
    pub max_form_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/backoffice.db".into(),
            route_prefix: DEFAULT_ROUTE_PREFIX.into(),
            csrf_secret: DEFAULT_CSRF_SECRET.into(),
            max_form_bytes: 64 * 1024,
        }
    }
}

/// Defaults, then `server.toml`, then `APP__*` variables, then the plain
/// variables older deployments set.
pub fn load_settings() -> anyhow::Result<Settings> {
    build_settings(Path::new("server.toml"), std::env::vars().collect())
}

pub(crate) fn build_settings(
    file: &Path,
    env: HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let mut settings: Settings = Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        )
        .build()
        .with_context(|| format!("failed to read settings from '{}'", file.display()))?
        .try_deserialize()
        .context("invalid server settings")?;

    let legacy = |modern: &str, plain: &str| {
        if env.contains_key(modern) {
            None
        } else {
            env.get(plain).cloned()
        }
    };
    if let Some(v) = legacy("APP__SERVER_BIND", "SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = legacy("APP__DATABASE_URL", "DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = legacy("APP__CSRF_SECRET", "CSRF_SECRET") {
        settings.csrf_secret = v;
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
