//! Error taxonomy shared by the three foundation components.
//!
//! Each component reports through its own `thiserror` enum; [`CirrusError`]
//! is the umbrella callers can collapse everything into. All failures are
//! detected synchronously and reported on first occurrence — there is no
//! multi-error aggregation and no internal retry.

use std::fmt;

use cirrus_s3_xml::XmlError;

/// Failures while setting up the crypto thread-safety bridge.
#[derive(Debug, thiserror::Error)]
pub enum LockBridgeError {
    /// The lock table itself could not be allocated.
    #[error("failed to allocate the static lock table")]
    LockTableAllocation,

    /// The caller's create capability failed while populating the table.
    ///
    /// Every handle created before `index` has already been destroyed.
    #[error("failed to create mutex for lock slot {index}")]
    FailedToCreateMutex {
        /// The table slot whose creation failed.
        index: usize,
    },
}

/// The bounded accumulator fields of an ACL decode.
///
/// Each field has its own overflow identity so a caller can tell exactly
/// which value in the document was oversized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclField {
    /// `AccessControlPolicy/Owner/ID`.
    OwnerId,
    /// `AccessControlPolicy/Owner/DisplayName`.
    OwnerDisplayName,
    /// `Grant/Grantee/EmailAddress`.
    GranteeEmailAddress,
    /// `Grant/Grantee/ID`.
    GranteeUserId,
    /// `Grant/Grantee/DisplayName`.
    GranteeDisplayName,
    /// `Grant/Grantee/URI`.
    GroupUri,
    /// `Grant/Permission`.
    PermissionToken,
}

impl AclField {
    /// A short human-readable name for the field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnerId => "owner ID",
            Self::OwnerDisplayName => "owner display name",
            Self::GranteeEmailAddress => "grantee email address",
            Self::GranteeUserId => "grantee user ID",
            Self::GranteeDisplayName => "grantee display name",
            Self::GroupUri => "grantee group URI",
            Self::PermissionToken => "permission",
        }
    }
}

impl fmt::Display for AclField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failures while decoding an ACL document.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    /// A bounded field's cumulative text exceeded its fixed maximum.
    #[error("ACL {0} is too long")]
    FieldTooLong(AclField),

    /// A grant closed while the output list was already at capacity.
    #[error("ACL contains more than {max} grants")]
    TooManyGrants {
        /// The caller-declared grant capacity.
        max: usize,
    },

    /// A grant closed without a resolvable grantee.
    #[error("ACL grant has a missing or unrecognized grantee")]
    BadGrantee,

    /// A grant closed with a missing or unrecognized permission token.
    #[error("ACL grant has a missing or unrecognized permission")]
    BadPermission,

    /// The underlying XML stream failed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Violations of the bucket-name grammar.
#[derive(Debug, thiserror::Error)]
pub enum BucketNameError {
    /// The name exceeds the style's length limit.
    #[error("bucket name exceeds {max} characters")]
    TooLong {
        /// The style-dependent length limit.
        max: usize,
    },

    /// The name is shorter than three characters.
    #[error("bucket name is shorter than 3 characters")]
    TooShort,

    /// The first character is not a letter or digit.
    #[error("bucket name must start with a letter or digit")]
    FirstCharacter,

    /// A character is not permitted under the requested style.
    #[error("bucket name contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// A `-.` or `.-` sequence, forbidden under virtual-host style.
    #[error("bucket name contains a forbidden '-.' or '.-' sequence")]
    CharacterSequence,

    /// The name looks like a dotted-quad IP address.
    #[error("bucket name must not resemble an IP address")]
    DotQuadNotation,
}

/// Umbrella error for every component in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CirrusError {
    /// Crypto thread-safety bridge setup failure.
    #[error(transparent)]
    LockBridge(#[from] LockBridgeError),

    /// ACL decode failure.
    #[error(transparent)]
    Acl(#[from] AclError),

    /// Bucket-name grammar violation.
    #[error(transparent)]
    BucketName(#[from] BucketNameError),

    /// XML streaming failure outside an ACL decode.
    #[error(transparent)]
    Xml(#[from] XmlError),
}
