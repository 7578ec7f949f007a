//! Entity tag computation.
//!
//! ETags follow the S3 conventions: a single-shot object carries the quoted
//! hex MD5 of its content, and a multipart object carries the MD5 of the
//! concatenated binary part digests followed by `-<part_count>`.

use md5::{Digest, Md5};

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use ruststack_transfer_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Compute the quoted hex MD5 of `data`, e.g.
/// `"5d41402abc4b2a76b9719d911017c592"`.
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Compute the composite ETag of a multipart object from its part ETags.
///
/// Part ETags may be quoted or not. Entries that are not valid hex are
/// skipped.
///
/// # Examples
///
/// ```
/// use ruststack_transfer_core::checksums::compute_multipart_etag;
///
/// let etag = compute_multipart_etag(&["\"5d41402abc4b2a76b9719d911017c592\""]);
/// assert!(etag.ends_with("-1\""));
/// ```
#[must_use]
pub fn compute_multipart_etag(part_etags: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_etags.len() * 16);
    for etag in part_etags {
        if let Ok(bytes) = hex::decode(unquote_etag(etag.as_ref())) {
            combined.extend_from_slice(&bytes);
        }
    }
    format!(
        "\"{}-{}\"",
        hex::encode(Md5::digest(&combined)),
        part_etags.len()
    )
}

/// Strip surrounding quotes from an ETag.
#[must_use]
pub fn unquote_etag(etag: &str) -> &str {
    etag.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_quote_etag() {
        assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
    }

    #[test]
    fn test_should_suffix_multipart_etag_with_part_count() {
        let parts = [compute_etag(b"a"), compute_etag(b"b"), compute_etag(b"c")];
        let etag = compute_multipart_etag(&parts);
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with("-3\""));
        assert_eq!(unquote_etag(&etag).len(), 32 + 2);
    }

    #[test]
    fn test_should_depend_on_part_order() {
        let a = compute_etag(b"a");
        let b = compute_etag(b"b");
        assert_ne!(
            compute_multipart_etag(&[a.clone(), b.clone()]),
            compute_multipart_etag(&[b, a])
        );
    }

    #[test]
    fn test_should_accept_quoted_and_bare_part_etags_alike() {
        let quoted = compute_etag(b"part");
        let bare = unquote_etag(&quoted).to_owned();
        assert_eq!(
            compute_multipart_etag(&[quoted.as_str()]),
            compute_multipart_etag(&[bare.as_str()])
        );
    }
}
