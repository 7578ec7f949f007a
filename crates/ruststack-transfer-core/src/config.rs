//! Transfer configuration.
//!
//! Provides [`CopyConfig`] for batch copies, [`MoveConfig`] which embeds a
//! copy configuration plus move-only settings, and [`RetryConfig`] for the
//! retry wrapper. Values can be loaded from environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{TransferError, TransferResult};
use crate::strategy::{MAX_PART_SIZE, MIB, MIN_PART_SIZE, TransferPolicy};

/// Default part size for multipart copies (50 MiB).
pub const DEFAULT_PART_SIZE: u64 = 50 * MIB;

/// Default number of objects transferred concurrently in one group.
pub const DEFAULT_GROUP_SIZE: usize = 100;

/// Bounded exponential backoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    #[builder(default = 3)]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[builder(default = 100)]
    pub base_delay_ms: u64,

    /// Upper bound on any single delay, in milliseconds.
    #[builder(default = 10_000)]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// Load from `TRANSFER_MAX_ATTEMPTS`, `TRANSFER_BASE_DELAY_MS` and
    /// `TRANSFER_MAX_DELAY_MS`, falling back to defaults.
    pub fn from_env() -> TransferResult<Self> {
        let mut config = Self::default();

        if let Some(n) = env_parse::<u32>("TRANSFER_MAX_ATTEMPTS")? {
            config.max_attempts = n;
        }
        if let Some(n) = env_parse::<u64>("TRANSFER_BASE_DELAY_MS")? {
            config.base_delay_ms = n;
        }
        if let Some(n) = env_parse::<u64>("TRANSFER_MAX_DELAY_MS")? {
            config.max_delay_ms = n;
        }

        Ok(config)
    }
}

/// Settings for a batch copy.
///
/// Owned by the caller and only read by the engine during a batch.
///
/// # Examples
///
/// ```
/// use ruststack_transfer_core::config::CopyConfig;
/// use ruststack_transfer_core::strategy::TransferPolicy;
///
/// let config = CopyConfig::builder()
///     .part_size(16 * 1024 * 1024)
///     .policy(TransferPolicy::PreferMultipart)
///     .build();
/// assert_eq!(config.group_size, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CopyConfig {
    /// Part size in bytes for multipart copies.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: u64,

    /// Single vs multipart selection rule.
    #[builder(default)]
    pub policy: TransferPolicy,

    /// Objects transferred concurrently per group.
    #[builder(default = DEFAULT_GROUP_SIZE)]
    pub group_size: usize,

    /// Retry settings for every remote call.
    #[builder(default)]
    pub retry: RetryConfig,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            policy: TransferPolicy::default(),
            group_size: DEFAULT_GROUP_SIZE,
            retry: RetryConfig::default(),
        }
    }
}

impl CopyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `TRANSFER_PART_SIZE` | `52428800` |
    /// | `TRANSFER_POLICY` | `standard` |
    /// | `TRANSFER_GROUP_SIZE` | `100` |
    /// | `TRANSFER_MAX_ATTEMPTS` | `3` |
    /// | `TRANSFER_BASE_DELAY_MS` | `100` |
    /// | `TRANSFER_MAX_DELAY_MS` | `10000` |
    pub fn from_env() -> TransferResult<Self> {
        let mut config = Self {
            retry: RetryConfig::from_env()?,
            ..Self::default()
        };

        if let Some(n) = env_parse::<u64>("TRANSFER_PART_SIZE")? {
            config.part_size = n;
        }
        if let Ok(v) = std::env::var("TRANSFER_POLICY") {
            config.policy = v.parse()?;
        }
        if let Some(n) = env_parse::<usize>("TRANSFER_GROUP_SIZE")? {
            config.group_size = n;
        }

        Ok(config)
    }

    /// Reject settings no batch can run with.
    pub fn validate(&self) -> TransferResult<()> {
        validate_part_size(self.part_size)?;
        if self.group_size == 0 {
            return Err(TransferError::Config(
                "group size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Settings for a batch move: a copy configuration plus how sources are
/// deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct MoveConfig {
    /// Copy settings.
    #[builder(default)]
    pub copy: CopyConfig,

    /// Delete sources with bulk deletes after the whole batch is copied,
    /// instead of one delete right after each copy.
    #[builder(default = false)]
    pub batched_delete: bool,
}

impl MoveConfig {
    /// Load from the [`CopyConfig`] variables plus `TRANSFER_BATCHED_DELETE`.
    pub fn from_env() -> TransferResult<Self> {
        let mut config = Self {
            copy: CopyConfig::from_env()?,
            batched_delete: false,
        };
        if let Ok(v) = std::env::var("TRANSFER_BATCHED_DELETE") {
            config.batched_delete = parse_bool(&v);
        }
        Ok(config)
    }

    /// Reject settings no batch can run with.
    pub fn validate(&self) -> TransferResult<()> {
        self.copy.validate()
    }
}

/// Check `part_size` against the `[5 MiB, 5 GiB]` bounds.
pub fn validate_part_size(part_size: u64) -> TransferResult<()> {
    if (MIN_PART_SIZE..=MAX_PART_SIZE).contains(&part_size) {
        Ok(())
    } else {
        Err(TransferError::InvalidPartSize { part_size })
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
pub(crate) fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn env_parse<T: std::str::FromStr>(name: &str) -> TransferResult<Option<T>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TransferError::Config(format!("invalid value for {name}: {v}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::GIB;

    #[test]
    fn test_should_create_default_config() {
        let config = CopyConfig::default();
        assert_eq!(config.part_size, 50 * MIB);
        assert_eq!(config.group_size, 100);
        assert!(matches!(config.policy, TransferPolicy::Standard));
        assert_eq!(config.retry, RetryConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_should_reject_part_size_out_of_bounds() {
        assert!(matches!(
            validate_part_size(5 * MIB - 1),
            Err(TransferError::InvalidPartSize { part_size }) if part_size == 5 * MIB - 1
        ));
        assert!(validate_part_size(5 * MIB).is_ok());
        assert!(validate_part_size(5 * GIB).is_ok());
        assert!(validate_part_size(5 * GIB + 1).is_err());
    }

    #[test]
    fn test_should_reject_zero_group_size() {
        let config = CopyConfig::builder().group_size(0).build();
        assert!(matches!(config.validate(), Err(TransferError::Config(_))));
    }

    #[test]
    fn test_should_embed_copy_config_in_move_config() {
        let config = MoveConfig::builder()
            .copy(CopyConfig::builder().group_size(10).build())
            .batched_delete(true)
            .build();
        assert_eq!(config.copy.group_size, 10);
        assert!(config.batched_delete);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_should_build_retry_config_with_typed_builder() {
        let retry = RetryConfig::builder().max_attempts(5).build();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.base_delay_ms, 100);
        assert_eq!(retry.max_delay_ms, 10_000);
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let json = serde_json::to_string(&MoveConfig::default()).expect("test serialization");
        assert!(json.contains("batchedDelete"));
        assert!(json.contains("partSize"));
        assert!(json.contains("\"policy\":\"standard\""));
    }

    #[test]
    fn test_should_load_from_env() {
        let config = CopyConfig::from_env();
        assert!(config.is_ok());
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("no"));
    }
}
