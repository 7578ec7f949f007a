//! Single-copy vs multipart-copy selection.
//!
//! The decision is a pure function of the object size, the configured part
//! size and the caller's [`TransferPolicy`]. It performs no I/O.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// One gibibyte.
pub const GIB: u64 = 1024 * MIB;

/// Smallest allowed part size.
pub const MIN_PART_SIZE: u64 = 5 * MIB;

/// Largest allowed part size.
pub const MAX_PART_SIZE: u64 = 5 * GIB;

/// Largest object a single server-side copy can handle.
pub const MAX_SINGLE_COPY_SIZE: u64 = 5 * GIB;

/// Objects smaller than this are never split.
pub const MIN_MULTIPART_OBJECT_SIZE: u64 = 5 * MIB;

/// Maximum number of parts in one multipart upload.
pub const MAX_PARTS: u64 = 10_000;

/// Caller-defined `(object_size, part_size) -> use_multipart` rule.
#[derive(Clone)]
pub struct SizePredicate(Arc<dyn Fn(u64, u64) -> bool + Send + Sync>);

impl SizePredicate {
    /// Wrap a closure.
    pub fn new(f: impl Fn(u64, u64) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn call(&self, object_size: u64, part_size: u64) -> bool {
        (self.0)(object_size, part_size)
    }
}

impl fmt::Debug for SizePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SizePredicate(..)")
    }
}

/// Which rule decides between single and multipart copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferPolicy {
    /// Multipart only above the single-copy ceiling.
    #[default]
    Standard,
    /// Multipart whenever the object is large enough and the part size
    /// actually splits it.
    PreferMultipart,
    /// Caller-supplied rule. Not serializable.
    #[serde(skip)]
    Custom(SizePredicate),
}

impl TransferPolicy {
    /// Decide whether an object of `object_size` bytes is copied in parts.
    ///
    /// Objects above [`MAX_SINGLE_COPY_SIZE`] always use multipart whatever
    /// the policy, since the store cannot copy them in one call.
    ///
    /// # Examples
    ///
    /// ```
    /// use ruststack_transfer_core::strategy::{GIB, MIB, TransferPolicy};
    ///
    /// let standard = TransferPolicy::Standard;
    /// assert!(!standard.should_use_multipart(100 * MIB, 8 * MIB));
    /// assert!(standard.should_use_multipart(6 * GIB, 8 * MIB));
    ///
    /// let prefer = TransferPolicy::PreferMultipart;
    /// assert!(prefer.should_use_multipart(100 * MIB, 8 * MIB));
    /// assert!(!prefer.should_use_multipart(4 * MIB, MIB));
    /// ```
    #[must_use]
    pub fn should_use_multipart(&self, object_size: u64, part_size: u64) -> bool {
        match self {
            Self::Standard => should_use_multipart(object_size, part_size, false),
            Self::PreferMultipart => should_use_multipart(object_size, part_size, true),
            Self::Custom(predicate) => {
                object_size > MAX_SINGLE_COPY_SIZE || predicate.call(object_size, part_size)
            }
        }
    }
}

impl FromStr for TransferPolicy {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "prefer-multipart" | "prefer_multipart" => Ok(Self::PreferMultipart),
            other => Err(TransferError::Config(format!(
                "unknown transfer policy '{other}', expected 'standard' or 'prefer-multipart'"
            ))),
        }
    }
}

/// The two built-in selection rules.
///
/// - standard: `object_size > 5 GiB`
/// - prefer-multipart: `object_size >= 5 MiB && part_size < object_size`
#[must_use]
pub fn should_use_multipart(object_size: u64, part_size: u64, prefer_multipart: bool) -> bool {
    if prefer_multipart {
        object_size >= MIN_MULTIPART_OBJECT_SIZE && part_size < object_size
    } else {
        object_size > MAX_SINGLE_COPY_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_use_single_copy_up_to_ceiling_under_standard_policy() {
        assert!(!should_use_multipart(0, 8 * MIB, false));
        assert!(!should_use_multipart(8 * MIB, 8 * MIB, false));
        assert!(!should_use_multipart(MAX_SINGLE_COPY_SIZE, 8 * MIB, false));
        assert!(should_use_multipart(MAX_SINGLE_COPY_SIZE + 1, 8 * MIB, false));
    }

    #[test]
    fn test_should_require_minimum_size_under_prefer_policy() {
        assert!(!should_use_multipart(MIN_MULTIPART_OBJECT_SIZE - 1, MIB, true));
        assert!(should_use_multipart(MIN_MULTIPART_OBJECT_SIZE, MIB, true));
    }

    #[test]
    fn test_should_require_part_size_to_split_object_under_prefer_policy() {
        assert!(!should_use_multipart(10 * MIB, 10 * MIB, true));
        assert!(!should_use_multipart(10 * MIB, 20 * MIB, true));
        assert!(should_use_multipart(10 * MIB + 1, 10 * MIB, true));
    }

    #[test]
    fn test_should_force_multipart_above_ceiling_for_every_policy() {
        let size = 6 * GIB;
        let never = TransferPolicy::Custom(SizePredicate::new(|_, _| false));
        for policy in [TransferPolicy::Standard, TransferPolicy::PreferMultipart, never] {
            assert!(policy.should_use_multipart(size, 5 * MIB), "{policy:?}");
        }
    }

    #[test]
    fn test_should_delegate_to_custom_predicate() {
        let policy = TransferPolicy::Custom(SizePredicate::new(|size, _| size % 2 == 0));
        assert!(policy.should_use_multipart(4, 5 * MIB));
        assert!(!policy.should_use_multipart(5, 5 * MIB));
    }

    #[test]
    fn test_should_parse_policy_names() {
        assert!(matches!(
            "standard".parse::<TransferPolicy>(),
            Ok(TransferPolicy::Standard)
        ));
        assert!(matches!(
            "Prefer-Multipart".parse::<TransferPolicy>(),
            Ok(TransferPolicy::PreferMultipart)
        ));
        assert!("sometimes".parse::<TransferPolicy>().is_err());
    }

    #[test]
    fn test_should_serialize_builtin_policies_as_kebab_case() {
        let json = serde_json::to_string(&TransferPolicy::PreferMultipart).expect("test serialization");
        assert_eq!(json, "\"prefer-multipart\"");
    }
}
