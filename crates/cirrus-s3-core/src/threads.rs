//! Thread-safety bridge between a caller-supplied mutex capability and an
//! external crypto library's locking-callback protocol.
//!
//! The crypto library demands externally supplied locking: a fixed table of
//! locks addressed by index, a create/lock/unlock/destroy quartet for locks
//! it allocates on demand, and a thread-identity callback. The bridge owns
//! the static table and translates every callback onto a caller-supplied
//! [`MutexProvider`]; it holds no lock of its own.
//!
//! [`ThreadSafetyBridge::initialize`] and
//! [`ThreadSafetyBridge::deinitialize`] must each run exactly once, on one
//! thread, with no crypto-library activity in flight. Everything in between
//! is protected by the crypto library's use of the registered callbacks plus
//! the correctness of the caller's mutex implementation.

use std::fmt;
use std::sync::Arc;

use crate::error::LockBridgeError;

/// Opaque token for a caller-created mutex.
///
/// The meaning of the value is entirely caller-defined (a pointer, a slot
/// number, a key into a registry); the bridge stores it and hands it back
/// to the caller's capability functions without inspecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutexHandle(u64);

impl MutexHandle {
    /// The non-null sentinel yielded in single-threaded mode, satisfying
    /// the crypto library's non-null check without naming a real mutex.
    pub const SINGLE_THREADED: Self = Self(1);

    /// Wraps a caller-defined raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Unwraps the caller-defined raw value.
    #[must_use]
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

/// Whether a locking callback is acquiring or releasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Take the lock.
    Acquire,
    /// Release the lock.
    Release,
}

/// A dynamically created lock, owned by the crypto library between its
/// create and destroy callbacks. Opaque outside this module.
#[derive(Debug)]
pub struct DynLock(MutexHandle);

/// Caller-supplied mutex capability set.
///
/// The default methods model the absent-capability, single-threaded mode:
/// `create` yields the non-null sentinel and the remaining operations are
/// no-ops. Implement only the methods the host application actually
/// provides.
pub trait MutexProvider: Send + Sync {
    /// Creates a mutex, or `None` on failure.
    fn create(&self) -> Option<MutexHandle> {
        Some(MutexHandle::SINGLE_THREADED)
    }

    /// Locks the mutex behind `handle`.
    fn lock(&self, handle: MutexHandle) {
        let _ = handle;
    }

    /// Unlocks the mutex behind `handle`.
    fn unlock(&self, handle: MutexHandle) {
        let _ = handle;
    }

    /// Destroys the mutex behind `handle`. After this call the handle is
    /// dead and is never passed back.
    fn destroy(&self, handle: MutexHandle) {
        let _ = handle;
    }
}

/// The all-defaults provider for single-threaded host applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleThreaded;

impl MutexProvider for SingleThreaded {}

/// Thread-identity callback, passed verbatim to the crypto library.
pub type ThreadIdCallback = fn() -> u64;

/// Static lock/unlock callback over the fixed table: mode bit plus index.
pub type StaticLockCallback = Box<dyn Fn(LockMode, usize) + Send + Sync>;

/// Dynamic-lock creation callback; `None` signals failure.
pub type DynLockCreateCallback = Box<dyn Fn() -> Option<DynLock> + Send + Sync>;

/// Dynamic-lock lock/unlock callback.
pub type DynLockUseCallback = Box<dyn Fn(LockMode, &DynLock) + Send + Sync>;

/// Dynamic-lock destruction callback; consumes the lock token.
pub type DynLockDestroyCallback = Box<dyn Fn(DynLock) + Send + Sync>;

/// The crypto library's callback-registration surface.
///
/// Signatures are fixed by the library's contract: five independently
/// registered hooks, where registering `None` unregisters. The lock index
/// passed to the static callback is trusted to be within
/// `0..num_locks()`; out-of-range indices are undefined by the library's
/// own contract and are not defended against here.
pub trait CryptoHost {
    /// Number of static locks the library requires.
    fn num_locks(&self) -> usize;

    /// Registers the thread-identity callback.
    fn set_id_callback(&mut self, callback: Option<ThreadIdCallback>);

    /// Registers the static table locking callback.
    fn set_locking_callback(&mut self, callback: Option<StaticLockCallback>);

    /// Registers the dynamic-lock creation callback.
    fn set_dynlock_create_callback(&mut self, callback: Option<DynLockCreateCallback>);

    /// Registers the dynamic-lock lock/unlock callback.
    fn set_dynlock_lock_callback(&mut self, callback: Option<DynLockUseCallback>);

    /// Registers the dynamic-lock destruction callback.
    fn set_dynlock_destroy_callback(&mut self, callback: Option<DynLockDestroyCallback>);
}

/// Owner of the static lock table and the five registered hooks.
///
/// One bridge per crypto library per process: the library's registration
/// API is inherently global, so the bridge is constructed at library
/// initialization and torn down at deinitialization.
pub struct ThreadSafetyBridge {
    provider: Arc<dyn MutexProvider>,
    table: Arc<[MutexHandle]>,
}

impl fmt::Debug for ThreadSafetyBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The provider is an opaque capability and has no Debug contract.
        f.debug_struct("ThreadSafetyBridge")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl ThreadSafetyBridge {
    /// Builds the static lock table and registers all five hooks.
    ///
    /// The table holds exactly `host.num_locks()` live handles. If the
    /// provider's `create` fails at slot `k`, every handle created for
    /// slots `[0, k)` is destroyed, in creation order, before the error is
    /// returned; no partially populated table is ever left reachable.
    ///
    /// # Errors
    ///
    /// [`LockBridgeError::LockTableAllocation`] if the table itself cannot
    /// be allocated; [`LockBridgeError::FailedToCreateMutex`] if a slot's
    /// mutex creation fails.
    pub fn initialize(
        host: &mut dyn CryptoHost,
        provider: Arc<dyn MutexProvider>,
        thread_id: Option<ThreadIdCallback>,
    ) -> Result<Self, LockBridgeError> {
        let count = host.num_locks();

        let mut table = Vec::new();
        table
            .try_reserve_exact(count)
            .map_err(|_| LockBridgeError::LockTableAllocation)?;

        for index in 0..count {
            match provider.create() {
                Some(handle) => table.push(handle),
                None => {
                    for &created in &table {
                        provider.destroy(created);
                    }
                    return Err(LockBridgeError::FailedToCreateMutex { index });
                }
            }
        }
        let table: Arc<[MutexHandle]> = table.into();

        host.set_id_callback(thread_id);

        let p = Arc::clone(&provider);
        let t = Arc::clone(&table);
        host.set_locking_callback(Some(Box::new(move |mode, index| match mode {
            LockMode::Acquire => p.lock(t[index]),
            LockMode::Release => p.unlock(t[index]),
        })));

        let p = Arc::clone(&provider);
        host.set_dynlock_create_callback(Some(Box::new(move || p.create().map(DynLock))));

        let p = Arc::clone(&provider);
        host.set_dynlock_lock_callback(Some(Box::new(move |mode, lock: &DynLock| match mode {
            LockMode::Acquire => p.lock(lock.0),
            LockMode::Release => p.unlock(lock.0),
        })));

        let p = Arc::clone(&provider);
        host.set_dynlock_destroy_callback(Some(Box::new(move |lock: DynLock| p.destroy(lock.0))));

        tracing::debug!(lock_count = count, "installed crypto locking callbacks");

        Ok(Self { provider, table })
    }

    /// Number of handles in the static lock table.
    #[must_use]
    pub fn lock_count(&self) -> usize {
        self.table.len()
    }

    /// Unregisters all five hooks, then destroys every table entry.
    ///
    /// The hooks are cleared first: a concurrent crypto-library call could
    /// otherwise lock a handle that has already been destroyed. Clearing
    /// runs in the reverse of the install order.
    pub fn deinitialize(self, host: &mut dyn CryptoHost) {
        host.set_dynlock_destroy_callback(None);
        host.set_dynlock_lock_callback(None);
        host.set_dynlock_create_callback(None);
        host.set_locking_callback(None);
        host.set_id_callback(None);

        for &handle in self.table.iter() {
            self.provider.destroy(handle);
        }

        tracing::debug!(
            lock_count = self.table.len(),
            "removed crypto locking callbacks"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Shared chronological log of host and provider activity.
    type EventLog = Arc<Mutex<Vec<String>>>;

    /// Crypto host double that stores registered callbacks and logs every
    /// registration change.
    struct RecordingHost {
        lock_count: usize,
        log: EventLog,
        id_callback: Option<ThreadIdCallback>,
        locking: Option<StaticLockCallback>,
        dynlock_create: Option<DynLockCreateCallback>,
        dynlock_lock: Option<DynLockUseCallback>,
        dynlock_destroy: Option<DynLockDestroyCallback>,
    }

    impl RecordingHost {
        fn new(lock_count: usize, log: EventLog) -> Self {
            Self {
                lock_count,
                log,
                id_callback: None,
                locking: None,
                dynlock_create: None,
                dynlock_lock: None,
                dynlock_destroy: None,
            }
        }

        fn record(&self, name: &str, registered: bool) {
            let action = if registered { "set" } else { "clear" };
            self.log.lock().push(format!("{action} {name}"));
        }
    }

    impl CryptoHost for RecordingHost {
        fn num_locks(&self) -> usize {
            self.lock_count
        }

        fn set_id_callback(&mut self, callback: Option<ThreadIdCallback>) {
            self.record("id", callback.is_some());
            self.id_callback = callback;
        }

        fn set_locking_callback(&mut self, callback: Option<StaticLockCallback>) {
            self.record("locking", callback.is_some());
            self.locking = callback;
        }

        fn set_dynlock_create_callback(&mut self, callback: Option<DynLockCreateCallback>) {
            self.record("dynlock_create", callback.is_some());
            self.dynlock_create = callback;
        }

        fn set_dynlock_lock_callback(&mut self, callback: Option<DynLockUseCallback>) {
            self.record("dynlock_lock", callback.is_some());
            self.dynlock_lock = callback;
        }

        fn set_dynlock_destroy_callback(&mut self, callback: Option<DynLockDestroyCallback>) {
            self.record("dynlock_destroy", callback.is_some());
            self.dynlock_destroy = callback;
        }
    }

    /// Provider double that numbers handles sequentially and records every
    /// capability call.
    struct CountingProvider {
        log: EventLog,
        next_handle: AtomicU64,
        fail_at: Option<u64>,
    }

    impl CountingProvider {
        fn new(log: EventLog) -> Self {
            Self {
                log,
                next_handle: AtomicU64::new(100),
                fail_at: None,
            }
        }

        fn failing_at(log: EventLog, nth_create: u64) -> Self {
            Self {
                fail_at: Some(100 + nth_create),
                ..Self::new(log)
            }
        }
    }

    impl MutexProvider for CountingProvider {
        fn create(&self) -> Option<MutexHandle> {
            let raw = self.next_handle.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(raw) {
                self.log.lock().push("create failed".to_owned());
                return None;
            }
            self.log.lock().push(format!("create {raw}"));
            Some(MutexHandle::from_raw(raw))
        }

        fn lock(&self, handle: MutexHandle) {
            self.log.lock().push(format!("lock {}", handle.into_raw()));
        }

        fn unlock(&self, handle: MutexHandle) {
            self.log
                .lock()
                .push(format!("unlock {}", handle.into_raw()));
        }

        fn destroy(&self, handle: MutexHandle) {
            self.log
                .lock()
                .push(format!("destroy {}", handle.into_raw()));
        }
    }

    fn entries_matching(log: &EventLog, prefix: &str) -> Vec<String> {
        log.lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_should_create_exactly_lock_count_handles() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(10, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        let bridge = ThreadSafetyBridge::initialize(&mut host, provider, None)
            .expect("initialize succeeds");
        assert_eq!(bridge.lock_count(), 10);
        assert_eq!(entries_matching(&log, "create").len(), 10);
        assert!(entries_matching(&log, "destroy").is_empty());

        bridge.deinitialize(&mut host);
        let destroyed = entries_matching(&log, "destroy");
        assert_eq!(destroyed.len(), 10);
        // Every created handle destroyed exactly once, in creation order.
        let created: Vec<String> = entries_matching(&log, "create")
            .iter()
            .map(|e| e.replace("create", "destroy"))
            .collect();
        assert_eq!(destroyed, created);
    }

    #[test]
    fn test_should_handle_zero_lock_count() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(0, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        let bridge = ThreadSafetyBridge::initialize(&mut host, provider, None)
            .expect("initialize succeeds");
        assert_eq!(bridge.lock_count(), 0);
        bridge.deinitialize(&mut host);

        assert!(entries_matching(&log, "create").is_empty());
        assert!(entries_matching(&log, "destroy").is_empty());
    }

    #[test]
    fn test_should_roll_back_partial_table_on_create_failure() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(8, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::failing_at(Arc::clone(&log), 3));

        let err = ThreadSafetyBridge::initialize(&mut host, provider, None)
            .expect_err("creation fails at slot 3");
        assert!(matches!(
            err,
            LockBridgeError::FailedToCreateMutex { index: 3 }
        ));

        // Exactly the three already-created handles destroyed, in order.
        assert_eq!(
            entries_matching(&log, "destroy"),
            vec!["destroy 100", "destroy 101", "destroy 102"]
        );
        // No hooks were ever installed.
        assert!(host.locking.is_none());
        assert!(host.dynlock_create.is_none());
    }

    #[test]
    fn test_should_dispatch_static_callback_to_indexed_handle() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(4, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        let bridge = ThreadSafetyBridge::initialize(&mut host, provider, None)
            .expect("initialize succeeds");

        let locking = host.locking.as_ref().expect("locking hook installed");
        locking(LockMode::Acquire, 2);
        locking(LockMode::Release, 2);
        locking(LockMode::Acquire, 0);

        // Handles are numbered 100.. in slot order.
        assert_eq!(entries_matching(&log, "lock"), vec!["lock 102", "lock 100"]);
        assert_eq!(entries_matching(&log, "unlock"), vec!["unlock 102"]);

        bridge.deinitialize(&mut host);
    }

    #[test]
    fn test_should_round_trip_dynamic_locks_through_provider() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(1, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        let bridge = ThreadSafetyBridge::initialize(&mut host, provider, None)
            .expect("initialize succeeds");

        let create = host.dynlock_create.as_ref().expect("create hook");
        let lock = host.dynlock_lock.as_ref().expect("lock hook");
        let destroy = host.dynlock_destroy.as_ref().expect("destroy hook");

        let dyn_lock = create().expect("dynamic lock created");
        lock(LockMode::Acquire, &dyn_lock);
        lock(LockMode::Release, &dyn_lock);
        destroy(dyn_lock);

        // Slot 0 took handle 100; the dynamic lock is 101.
        assert_eq!(entries_matching(&log, "lock"), vec!["lock 101"]);
        assert_eq!(entries_matching(&log, "unlock"), vec!["unlock 101"]);
        assert_eq!(entries_matching(&log, "destroy"), vec!["destroy 101"]);

        bridge.deinitialize(&mut host);
    }

    #[test]
    fn test_should_clear_all_hooks_before_destroying_any_handle() {
        fn fake_thread_id() -> u64 {
            7
        }

        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(3, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        // A real thread-id callback keeps the install phase free of
        // "clear" entries, so every clear in the log belongs to teardown.
        let bridge = ThreadSafetyBridge::initialize(&mut host, provider, Some(fake_thread_id))
            .expect("initialize succeeds");
        bridge.deinitialize(&mut host);

        let events = log.lock().clone();
        let first_destroy = events
            .iter()
            .position(|e| e.starts_with("destroy"))
            .expect("handles destroyed");
        let clears: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("clear"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(clears.len(), 5);
        assert!(clears.iter().all(|&i| i < first_destroy));

        // Reverse of the install order.
        let clear_names: Vec<&str> = events
            .iter()
            .filter_map(|e| e.strip_prefix("clear "))
            .collect();
        assert_eq!(
            clear_names,
            vec![
                "dynlock_destroy",
                "dynlock_lock",
                "dynlock_create",
                "locking",
                "id"
            ]
        );
        assert!(host.locking.is_none());
        assert!(host.id_callback.is_none());
    }

    #[test]
    fn test_should_pass_thread_id_callback_verbatim() {
        fn fake_thread_id() -> u64 {
            42
        }

        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(1, Arc::clone(&log));
        let provider = Arc::new(CountingProvider::new(Arc::clone(&log)));

        let bridge =
            ThreadSafetyBridge::initialize(&mut host, provider, Some(fake_thread_id))
                .expect("initialize succeeds");

        let id = host.id_callback.expect("id hook installed");
        assert_eq!(id(), 42);

        bridge.deinitialize(&mut host);
    }

    #[test]
    fn test_should_support_single_threaded_no_op_mode() {
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(5, Arc::clone(&log));

        let bridge = ThreadSafetyBridge::initialize(&mut host, Arc::new(SingleThreaded), None)
            .expect("initialize succeeds");
        assert_eq!(bridge.lock_count(), 5);

        // The sentinel is non-null, satisfying the crypto library's check.
        let create = host.dynlock_create.as_ref().expect("create hook");
        assert!(create().is_some());

        // Locking is a harmless no-op.
        let locking = host.locking.as_ref().expect("locking hook");
        locking(LockMode::Acquire, 4);
        locking(LockMode::Release, 4);

        bridge.deinitialize(&mut host);
    }

    #[test]
    fn test_should_describe_bridge_without_a_debug_provider() {
        // Providers are opaque capabilities with no Debug contract; the
        // bridge still has to render for diagnostics.
        struct Plain;
        impl MutexProvider for Plain {}

        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(2, log);

        let bridge = ThreadSafetyBridge::initialize(&mut host, Arc::new(Plain), None)
            .expect("initialize succeeds");

        let rendered = format!("{bridge:?}");
        assert!(rendered.contains("ThreadSafetyBridge"));
        assert!(rendered.contains("table"));

        bridge.deinitialize(&mut host);
    }

    #[test]
    fn test_should_bridge_a_real_mutex_provider() {
        // Handles index into a fixed pool of real mutexes; guards are
        // tracked so lock and unlock can be split across callback calls.
        struct PoolProvider {
            flags: Vec<Mutex<bool>>,
        }

        impl MutexProvider for PoolProvider {
            fn create(&self) -> Option<MutexHandle> {
                static NEXT: AtomicU64 = AtomicU64::new(0);
                let raw = NEXT.fetch_add(1, Ordering::SeqCst);
                (raw < self.flags.len() as u64).then(|| MutexHandle::from_raw(raw))
            }

            fn lock(&self, handle: MutexHandle) {
                let idx = usize::try_from(handle.into_raw()).expect("small index");
                *self.flags[idx].lock() = true;
            }

            fn unlock(&self, handle: MutexHandle) {
                let idx = usize::try_from(handle.into_raw()).expect("small index");
                *self.flags[idx].lock() = false;
            }

            fn destroy(&self, _handle: MutexHandle) {}
        }

        let provider = Arc::new(PoolProvider {
            flags: (0..4).map(|_| Mutex::new(false)).collect(),
        });
        let log: EventLog = Arc::default();
        let mut host = RecordingHost::new(2, log);

        let shared: Arc<dyn MutexProvider> = provider.clone();
        let bridge = ThreadSafetyBridge::initialize(&mut host, shared, None)
            .expect("initialize succeeds");

        let locking = host.locking.as_ref().expect("locking hook");
        locking(LockMode::Acquire, 1);
        assert!(*provider.flags[1].lock());
        locking(LockMode::Release, 1);
        assert!(!*provider.flags[1].lock());

        bridge.deinitialize(&mut host);
    }
}
