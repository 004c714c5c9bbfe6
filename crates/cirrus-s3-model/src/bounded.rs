//! Fixed-capacity containers for bounded-memory decoding.
//!
//! The streaming ACL decoder accumulates text into buffers whose capacity is
//! fixed up front; an append that would exceed the bound fails before
//! anything is written, so a buffer is never left holding a truncated value.

use crate::types::{ACL_GRANT_MAXCOUNT, Grant};

/// An append would have exceeded a container's fixed capacity.
///
/// Nothing was written; the container still holds exactly what it held
/// before the failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded;

/// A string accumulator with a capacity fixed at construction.
///
/// Appends are cumulative: the bound applies to the total accumulated
/// length, not to any single chunk.
#[derive(Debug, Clone)]
pub struct BoundedString {
    buf: String,
    max: usize,
}

impl BoundedString {
    /// Creates an empty accumulator holding at most `max` bytes.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            buf: String::new(),
            max,
        }
    }

    /// Appends `chunk`, failing without writing if the cumulative length
    /// would exceed the capacity.
    pub fn try_push_str(&mut self, chunk: &str) -> Result<(), CapacityExceeded> {
        if self.buf.len() + chunk.len() > self.max {
            return Err(CapacityExceeded);
        }
        self.buf.push_str(chunk);
        Ok(())
    }

    /// The accumulated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Whether nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The fixed capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Discards the accumulated text, keeping the capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// A caller-owned grant buffer with a capacity fixed at construction.
///
/// Storage is allocated once, up front; [`try_push`](Self::try_push) refuses
/// to grow the list past the declared capacity, so a decoder writing into it
/// never allocates or resizes.
#[derive(Debug, Clone)]
pub struct GrantList {
    grants: Vec<Grant>,
    capacity: usize,
}

impl GrantList {
    /// Creates an empty list holding at most `capacity` grants.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            grants: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates an empty list sized to the S3 grant limit,
    /// [`ACL_GRANT_MAXCOUNT`].
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::with_capacity(ACL_GRANT_MAXCOUNT)
    }

    /// Appends a grant, failing without writing if the list is full.
    pub fn try_push(&mut self, grant: Grant) -> Result<(), CapacityExceeded> {
        if self.grants.len() == self.capacity {
            return Err(CapacityExceeded);
        }
        self.grants.push(grant);
        Ok(())
    }

    /// Whether the list has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.grants.len() == self.capacity
    }

    /// Number of grants committed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether no grants have been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// The fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The committed grants, in commit order.
    #[must_use]
    pub fn as_slice(&self) -> &[Grant] {
        &self.grants
    }

    /// Removes all grants, keeping the capacity.
    pub fn clear(&mut self) {
        self.grants.clear();
    }

    /// Iterates over the committed grants.
    pub fn iter(&self) -> std::slice::Iter<'_, Grant> {
        self.grants.iter()
    }
}

impl<'a> IntoIterator for &'a GrantList {
    type Item = &'a Grant;
    type IntoIter = std::slice::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}
