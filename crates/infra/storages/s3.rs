use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, timeout::TimeoutConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{Region, StalledStreamProtectionConfig},
    error::{ProvideErrorMetadata, SdkError},
};
use http::Uri;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub force_path_style: bool,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl S3Config {
    pub fn new(endpoint: String, region: String, access_key: String, secret_key: String) -> Self {
        Self {
            endpoint,
            region,
            access_key,
            secret_key,
            force_path_style: true,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        }
    }
}

pub async fn build_s3_client(config: &S3Config) -> Result<Client> {
    let endpoint = format!("{}/", config.endpoint.trim_end_matches('/'));
    Uri::from_str(&endpoint).context("invalid s3 endpoint URL")?;

    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "s3-compatible",
    );

    let region = Region::new(config.region.clone());
    let shared_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region.clone())
        .credentials_provider(credentials)
        .timeout_config(
            TimeoutConfig::builder()
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .read_timeout(Duration::from_secs(config.read_timeout_secs))
                .build(),
        )
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
        .endpoint_url(endpoint)
        .force_path_style(config.force_path_style)
        .region(region)
        .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
        .build();

    Ok(Client::from_conf(s3_config))
}

pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Turns an SDK failure into an error that names the bucket, key and the
/// service's own status/code, with a short preview of the response body.
pub fn map_s3_error<E>(err: SdkError<E>, action: &str, bucket: &str, object_key: &str) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(service_err) = &err {
        let raw = service_err.raw();
        let status = raw.status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_default();

        let mut detail = format!("failed to {} (status {}, code {})", action, status, code);

        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }

        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        if !body.is_empty() {
            let preview = body.chars().take(512).collect::<String>();
            detail.push_str(&format!("; body={}", preview));
        }

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context(format!(
        "failed to {} [bucket={}, key={}]",
        action, bucket, object_key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_prefix_slashes() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("candidates"), "candidates/");
        assert_eq!(normalize_prefix("/candidates/files/"), "candidates/files/");
    }

    #[tokio::test]
    async fn rejects_malformed_endpoint() {
        let config = S3Config::new(
            "http://exa mple".to_string(),
            "us-east-1".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );

        assert!(build_s3_client(&config).await.is_err());
    }
}
