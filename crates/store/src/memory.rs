use std::sync::Mutex;

use thiserror::Error;

use crate::state::LibraryState;

/// Storage-level failure, distinct from business-rule errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A previous writer panicked while holding the lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// In-memory transactional store.
///
/// Intended for tests/dev. Not optimized for performance.
///
/// `transaction` runs the closure against a scratch copy of the state and
/// swaps it in only on `Ok`, which gives:
///
/// - all-or-nothing commit: an `Err` from the closure discards every staged
///   write (record + book, or category + descendants);
/// - serialization of check-then-set races: the lock is held for the whole
///   unit of work, so two concurrent borrowers of the same book cannot both
///   observe it available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LibraryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one atomic unit of work.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut LibraryState) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut scratch = guard.clone();
        let out = f(&mut scratch)?;
        *guard = scratch;
        Ok(out)
    }

    /// Read from a consistent snapshot.
    pub fn read<T, E>(&self, f: impl FnOnce(&LibraryState) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let guard = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&guard)
    }
}
