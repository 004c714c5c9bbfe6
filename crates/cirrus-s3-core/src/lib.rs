//! Foundation services for the Cirrus S3 client library.
//!
//! Three independent components, each usable standalone:
//!
//! - [`threads`] — a bridge adapting a caller-supplied mutex capability to
//!   the locking-callback protocol an external crypto library imposes for
//!   thread safety.
//! - [`acl`] — a bounded-memory streaming decoder turning an XML access
//!   control list document into a caller-owned, fixed-capacity list of
//!   grants.
//! - [`validation`] — the bucket-name grammar for path-style and
//!   virtual-host-style addressing.
//!
//! HTTP transport, request signing, and retry scheduling belong to the
//! request-execution subsystem and are not part of this crate.

pub mod acl;
pub mod error;
pub mod threads;
pub mod validation;

pub use acl::decode_acl;
pub use error::{AclError, AclField, BucketNameError, CirrusError, LockBridgeError};
pub use threads::{
    CryptoHost, DynLock, DynLockCreateCallback, DynLockDestroyCallback, DynLockUseCallback,
    LockMode, MutexHandle, MutexProvider, SingleThreaded, StaticLockCallback, ThreadIdCallback,
    ThreadSafetyBridge,
};
pub use validation::validate_bucket_name;
