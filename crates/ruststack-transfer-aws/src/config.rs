//! S3 client configuration.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use typed_builder::TypedBuilder;

/// How to reach the object store.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct AwsClientConfig {
    /// Custom endpoint (e.g. a local S3-compatible server).
    #[builder(default, setter(strip_option, into))]
    pub endpoint_url: Option<String>,

    /// Address buckets as a path segment instead of a subdomain.
    #[builder(default = false)]
    pub force_path_style: bool,

    /// Region override. Falls back to the default provider chain.
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,

    /// Static `(access_key_id, secret_access_key)`. Falls back to the
    /// default provider chain.
    #[builder(default, setter(strip_option))]
    pub static_credentials: Option<(String, String)>,
}

impl AwsClientConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `S3_ENDPOINT_URL` | unset |
    /// | `S3_FORCE_PATH_STYLE` | `false` |
    /// | `AWS_REGION` | provider chain |
    ///
    /// Credentials always come from the default provider chain.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            region: std::env::var("AWS_REGION").ok().filter(|v| !v.is_empty()),
            static_credentials: None,
        }
    }
}

/// Build an S3 client from the default provider chain plus `config`.
pub async fn build_client(config: &AwsClientConfig) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some((access_key, secret_key)) = &config.static_credentials {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "ruststack-transfer",
        ));
    }
    let shared = loader.load().await;

    let mut builder =
        aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
    if let Some(url) = &config.endpoint_url {
        builder = builder.endpoint_url(url.clone());
    }

    aws_sdk_s3::Client::from_conf(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_config_with_typed_builder() {
        let config = AwsClientConfig::builder()
            .endpoint_url("http://localhost:4566")
            .force_path_style(true)
            .region("us-east-1")
            .build();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert!(config.force_path_style);
        assert!(config.static_credentials.is_none());
    }

    #[tokio::test]
    async fn test_should_build_client_for_custom_endpoint() {
        let config = AwsClientConfig::builder()
            .endpoint_url("http://localhost:4566")
            .force_path_style(true)
            .region("us-east-1")
            .static_credentials(("test".to_owned(), "test".to_owned()))
            .build();
        let client = build_client(&config).await;
        assert_eq!(
            client.config().region().map(ToString::to_string).as_deref(),
            Some("us-east-1")
        );
    }
}
