//! Streaming decoder for XML access-control-list documents.
//!
//! The decoder consumes path-based events from a [`PathReader`] and writes
//! grants into a caller-owned, fixed-capacity [`GrantList`]. Memory use is
//! bounded regardless of document size: every text field accumulates into a
//! [`BoundedString`] whose overflow is a terminal, per-field error, and the
//! grant list never grows past the caller's declared capacity.

use cirrus_s3_model::{
    BoundedString, Grant, GrantList, Grantee, MAX_GRANTEE_DISPLAY_NAME_LEN,
    MAX_GRANTEE_EMAIL_ADDRESS_LEN, MAX_GRANTEE_USER_ID_LEN, MAX_GROUP_URI_LEN,
    MAX_PERMISSION_TOKEN_LEN, Owner, Permission,
};
use cirrus_s3_xml::{PathEvent, PathReader};

use crate::error::{AclError, AclField};

const OWNER_ID_PATH: &str = "AccessControlPolicy/Owner/ID";
const OWNER_DISPLAY_NAME_PATH: &str = "AccessControlPolicy/Owner/DisplayName";
const GRANT_PATH: &str = "AccessControlPolicy/AccessControlList/Grant";
const GRANTEE_EMAIL_PATH: &str =
    "AccessControlPolicy/AccessControlList/Grant/Grantee/EmailAddress";
const GRANTEE_ID_PATH: &str = "AccessControlPolicy/AccessControlList/Grant/Grantee/ID";
const GRANTEE_DISPLAY_NAME_PATH: &str =
    "AccessControlPolicy/AccessControlList/Grant/Grantee/DisplayName";
const GRANTEE_URI_PATH: &str = "AccessControlPolicy/AccessControlList/Grant/Grantee/URI";
const PERMISSION_PATH: &str = "AccessControlPolicy/AccessControlList/Grant/Permission";

/// Transient decode state: two cumulative owner accumulators and five
/// per-grant accumulators, all bounded.
struct AclDecoder {
    owner_id: BoundedString,
    owner_display_name: BoundedString,
    email: BoundedString,
    user_id: BoundedString,
    user_display_name: BoundedString,
    group_uri: BoundedString,
    permission: BoundedString,
}

impl AclDecoder {
    fn new() -> Self {
        Self {
            owner_id: BoundedString::new(MAX_GRANTEE_USER_ID_LEN),
            owner_display_name: BoundedString::new(MAX_GRANTEE_DISPLAY_NAME_LEN),
            email: BoundedString::new(MAX_GRANTEE_EMAIL_ADDRESS_LEN),
            user_id: BoundedString::new(MAX_GRANTEE_USER_ID_LEN),
            user_display_name: BoundedString::new(MAX_GRANTEE_DISPLAY_NAME_LEN),
            group_uri: BoundedString::new(MAX_GROUP_URI_LEN),
            permission: BoundedString::new(MAX_PERMISSION_TOKEN_LEN),
        }
    }

    /// Routes one text chunk into the accumulator its path names.
    /// Unrecognized paths are ignored.
    fn accumulate(&mut self, path: &str, text: &str) -> Result<(), AclError> {
        let (buf, field) = match path {
            OWNER_ID_PATH => (&mut self.owner_id, AclField::OwnerId),
            OWNER_DISPLAY_NAME_PATH => (&mut self.owner_display_name, AclField::OwnerDisplayName),
            GRANTEE_EMAIL_PATH => (&mut self.email, AclField::GranteeEmailAddress),
            GRANTEE_ID_PATH => (&mut self.user_id, AclField::GranteeUserId),
            GRANTEE_DISPLAY_NAME_PATH => {
                (&mut self.user_display_name, AclField::GranteeDisplayName)
            }
            GRANTEE_URI_PATH => (&mut self.group_uri, AclField::GroupUri),
            PERMISSION_PATH => (&mut self.permission, AclField::PermissionToken),
            _ => return Ok(()),
        };
        buf.try_push_str(text)
            .map_err(|_| AclError::FieldTooLong(field))
    }

    /// Commits the grant in progress on close of a `Grant` element.
    ///
    /// The capacity check runs before anything else so a full list is never
    /// written past; grantee resolution then follows strict priority order.
    fn commit_grant(&mut self, grants: &mut GrantList) -> Result<(), AclError> {
        if grants.is_full() {
            return Err(AclError::TooManyGrants {
                max: grants.capacity(),
            });
        }

        let grantee = if !self.email.is_empty() {
            Grantee::EmailAddress(self.email.as_str().to_owned())
        } else if !self.user_id.is_empty() && !self.user_display_name.is_empty() {
            Grantee::CanonicalUser {
                id: self.user_id.as_str().to_owned(),
                display_name: self.user_display_name.as_str().to_owned(),
            }
        } else if !self.group_uri.is_empty() {
            Grantee::from_group_uri(self.group_uri.as_str()).ok_or(AclError::BadGrantee)?
        } else {
            return Err(AclError::BadGrantee);
        };

        let permission =
            Permission::from_token(self.permission.as_str()).ok_or(AclError::BadPermission)?;

        grants
            .try_push(Grant {
                grantee,
                permission,
            })
            .map_err(|_| AclError::TooManyGrants {
                max: grants.capacity(),
            })?;

        self.email.clear();
        self.user_id.clear();
        self.user_display_name.clear();
        self.group_uri.clear();
        self.permission.clear();
        // Owner accumulators are cumulative for the whole document and are
        // deliberately not reset here.

        Ok(())
    }

    fn into_owner(self) -> Owner {
        Owner {
            id: self.owner_id.as_str().to_owned(),
            display_name: self.owner_display_name.as_str().to_owned(),
        }
    }
}

/// Decodes an ACL document into owner fields and a grant list.
///
/// `grants` is cleared, then populated in document order; its capacity is
/// never exceeded and it is never reallocated. On failure the decode stops
/// immediately and `grants` retains exactly the grants committed before the
/// error.
///
/// Owner fields are empty strings when the document omits them.
///
/// # Errors
///
/// Returns the first [`AclError`] encountered: a per-field overflow, a
/// grant that cannot be resolved ([`AclError::BadGrantee`] /
/// [`AclError::BadPermission`]), [`AclError::TooManyGrants`] when a grant
/// closes with the list already full, or an XML-level failure.
pub fn decode_acl(xml: &str, grants: &mut GrantList) -> Result<Owner, AclError> {
    grants.clear();

    let mut decoder = AclDecoder::new();
    let mut reader = PathReader::new(xml);

    let result = loop {
        match reader.next_event() {
            Ok(Some(PathEvent::Text { path, text })) => {
                if let Err(err) = decoder.accumulate(&path, &text) {
                    break Err(err);
                }
            }
            Ok(Some(PathEvent::Close { path })) => {
                if path == GRANT_PATH {
                    if let Err(err) = decoder.commit_grant(grants) {
                        break Err(err);
                    }
                }
            }
            Ok(None) => break Ok(()),
            Err(err) => break Err(AclError::from(err)),
        }
    };

    match result {
        Ok(()) => Ok(decoder.into_owner()),
        Err(err) => {
            tracing::warn!(
                committed = grants.len(),
                error = %err,
                "ACL decode aborted"
            );
            Err(err)
        }
    }
}
