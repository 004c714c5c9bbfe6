//! ACL and bucket-addressing types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length in bytes of a grantee email address.
pub const MAX_GRANTEE_EMAIL_ADDRESS_LEN: usize = 128;

/// Maximum length in bytes of a grantee (or owner) canonical user ID.
pub const MAX_GRANTEE_USER_ID_LEN: usize = 128;

/// Maximum length in bytes of a grantee (or owner) display name.
pub const MAX_GRANTEE_DISPLAY_NAME_LEN: usize = 128;

/// Maximum length in bytes of a grantee group URI.
pub const MAX_GROUP_URI_LEN: usize = 128;

/// Maximum length in bytes of a permission token.
pub const MAX_PERMISSION_TOKEN_LEN: usize = 32;

/// Maximum number of grants that may appear in a single ACL.
///
/// This is both the S3 service limit and the default capacity for
/// [`GrantList::with_default_capacity`](crate::GrantList::with_default_capacity).
pub const ACL_GRANT_MAXCOUNT: usize = 100;

/// Group URI granting access to all authenticated AWS users.
pub const AUTHENTICATED_USERS_GROUP_URI: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";

/// Group URI granting access to everyone.
pub const ALL_USERS_GROUP_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// The form of URI used to address a bucket.
///
/// The two styles impose different naming grammars: virtual-host-style names
/// must be valid DNS labels and are therefore more restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UriStyle {
    /// `https://bucket.s3.amazonaws.com/key` addressing.
    VirtualHost,
    /// `https://s3.amazonaws.com/bucket/key` addressing.
    Path,
}

/// S3 ACL permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "READ")]
    Read,
    #[serde(rename = "WRITE")]
    Write,
    #[serde(rename = "READ_ACP")]
    ReadAcp,
    #[serde(rename = "WRITE_ACP")]
    WriteAcp,
    #[serde(rename = "FULL_CONTROL")]
    FullControl,
}

impl Permission {
    /// Returns the wire token for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
            Self::FullControl => "FULL_CONTROL",
        }
    }

    /// Parses a wire token into a permission.
    ///
    /// Only the five exact literals are recognized; anything else, including
    /// the empty string, yields `None`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "READ" => Some(Self::Read),
            "WRITE" => Some(Self::Write),
            "READ_ACP" => Some(Self::ReadAcp),
            "WRITE_ACP" => Some(Self::WriteAcp),
            "FULL_CONTROL" => Some(Self::FullControl),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The identity a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grantee {
    /// A customer identified by email address.
    EmailAddress(String),
    /// A canonical user identified by ID and display name.
    CanonicalUser {
        /// Canonical user ID.
        id: String,
        /// Human-readable display name.
        display_name: String,
    },
    /// The built-in group of all authenticated AWS users.
    AllAwsUsers,
    /// The built-in group of all users, authenticated or not.
    AllUsers,
}

impl Grantee {
    /// Resolves a group URI to its built-in group grantee.
    ///
    /// Exactly two URIs are recognized; any other value yields `None`.
    #[must_use]
    pub fn from_group_uri(uri: &str) -> Option<Self> {
        match uri {
            AUTHENTICATED_USERS_GROUP_URI => Some(Self::AllAwsUsers),
            ALL_USERS_GROUP_URI => Some(Self::AllUsers),
            _ => None,
        }
    }
}

/// One (grantee, permission) pair within an ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Who the grant applies to.
    pub grantee: Grantee,
    /// What the grantee may do.
    pub permission: Permission,
}

/// The owner of a bucket or object, as reported in its ACL.
///
/// Either field may be empty when the document omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Canonical user ID of the owner.
    pub id: String,
    /// Human-readable display name of the owner.
    pub display_name: String,
}
