use anyhow::{Context, Result};
use std::str::FromStr;

use super::config_model::{BackendServer, Database, DotEnvyConfig, ObjectStorage};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT_MIB: u64 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BUCKET: &str = "uploads";
const DEFAULT_REGION: &str = "us-east-1";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: parse_or("PORT", DEFAULT_PORT)?,
        body_limit: parse_or("SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT_MIB)?,
        timeout: parse_or("SERVER_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let object_storage = ObjectStorage {
        endpoint: required("OBJECT_STORAGE_ENDPOINT")?,
        region: optional("OBJECT_STORAGE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        bucket: optional("OBJECT_STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
        access_key: required("OBJECT_STORAGE_ACCESS_KEY")?,
        secret_key: required("OBJECT_STORAGE_SECRET_KEY")?,
        key_prefix: optional("OBJECT_STORAGE_KEY_PREFIX").unwrap_or_default(),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        object_storage,
    })
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{} is required", key))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} is invalid: {:?}", key, raw)),
        None => Ok(default),
    }
}
