//! Data model for the Cirrus S3 client.
//!
//! This crate holds the pure data types shared across the client: access
//! control list (ACL) grants and owners, bucket addressing styles, and the
//! fixed-capacity containers the streaming ACL decoder writes into. Nothing
//! here performs I/O; the types are plain values with S3's wire tokens
//! attached where the protocol defines them.

mod bounded;
mod types;

pub use bounded::{BoundedString, CapacityExceeded, GrantList};
pub use types::{
    ACL_GRANT_MAXCOUNT, ALL_USERS_GROUP_URI, AUTHENTICATED_USERS_GROUP_URI, Grant, Grantee,
    MAX_GRANTEE_DISPLAY_NAME_LEN, MAX_GRANTEE_EMAIL_ADDRESS_LEN, MAX_GRANTEE_USER_ID_LEN,
    MAX_GROUP_URI_LEN, MAX_PERMISSION_TOKEN_LEN, Owner, Permission, UriStyle,
};
