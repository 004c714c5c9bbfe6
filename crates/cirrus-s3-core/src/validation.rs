//! Bucket-name grammar validation.
//!
//! Virtual-host-style names become DNS labels, so they carry the tighter
//! grammar: 63 characters, no underscores, and no `-.` / `.-` sequences.
//! Path-style names only appear in the request path and allow up to 255
//! characters with underscores.

use cirrus_s3_model::UriStyle;

use crate::error::BucketNameError;

const VIRTUAL_HOST_MAX_LEN: usize = 63;
const PATH_MAX_LEN: usize = 255;
const MIN_LEN: usize = 3;

/// Validates a bucket name against the grammar for the given URI style.
///
/// A single left-to-right scan with one byte of lookback; the first
/// violation is reported and nothing else is examined.
///
/// # Errors
///
/// Returns the [`BucketNameError`] kind for the first violated rule:
/// length limits, first-character class, per-style character set,
/// `-.`/`.-` adjacency under virtual-host style, and finally the
/// dotted-quad heuristic — any name with at least one dot and no letters
/// is rejected outright, deliberately over-rejecting rather than trying to
/// recognize real IP addresses.
///
/// # Examples
///
/// ```
/// use cirrus_s3_core::validation::validate_bucket_name;
/// use cirrus_s3_model::UriStyle;
///
/// assert!(validate_bucket_name("my-bucket", UriStyle::VirtualHost).is_ok());
/// assert!(validate_bucket_name("my_bucket", UriStyle::VirtualHost).is_err());
/// assert!(validate_bucket_name("my_bucket", UriStyle::Path).is_ok());
/// ```
pub fn validate_bucket_name(name: &str, style: UriStyle) -> Result<(), BucketNameError> {
    let virtual_host = style == UriStyle::VirtualHost;
    let max_len = if virtual_host {
        VIRTUAL_HOST_MAX_LEN
    } else {
        PATH_MAX_LEN
    };

    let mut len = 0usize;
    let mut prev = 0u8;
    let mut has_dot = false;
    let mut has_alpha = false;

    for &b in name.as_bytes() {
        if len == max_len {
            return Err(BucketNameError::TooLong { max: max_len });
        }
        if b.is_ascii_alphabetic() {
            has_alpha = true;
        } else if b.is_ascii_digit() {
            // Accepted in any position.
        } else if len == 0 {
            return Err(BucketNameError::FirstCharacter);
        } else if b == b'_' {
            if virtual_host {
                return Err(BucketNameError::InvalidCharacter('_'));
            }
        } else if b == b'-' {
            if virtual_host && prev == b'.' {
                return Err(BucketNameError::CharacterSequence);
            }
        } else if b == b'.' {
            if virtual_host && prev == b'-' {
                return Err(BucketNameError::CharacterSequence);
            }
            has_dot = true;
        } else {
            return Err(BucketNameError::InvalidCharacter(char::from(b)));
        }
        len += 1;
        prev = b;
    }

    if len < MIN_LEN {
        return Err(BucketNameError::TooShort);
    }

    // The provider's "IP address style" rule is underspecified; be
    // conservative and reject any dotted name with no letters at all,
    // whether or not it is a real IPv4 address.
    if has_dot && !has_alpha {
        return Err(BucketNameError::DotQuadNotation);
    }

    Ok(())
}
