//! Circular dependency detection infrastructure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

pub(crate) const MAX_DEPTH: usize = 1024;

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

/// The keys being resolved on the current call path, outermost first.
///
/// A chain is created by every top-level resolution and threaded through
/// dependency resolution, so detection works the same on every thread and
/// never depends on unwinding.
#[derive(Debug)]
pub(crate) struct ResolutionChain {
    id: u64,
    stack: Vec<TypeKey>,
}

impl ResolutionChain {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed),
            stack: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Runs `f` with `key` pushed on the chain.
    pub(crate) fn scoped<T, F>(&mut self, key: TypeKey, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        self.push(key)?;
        let result = f(self);
        self.stack.pop();
        result
    }

    fn path(&self) -> Vec<&'static str> {
        self.stack.iter().map(TypeKey::display_name).collect()
    }

    fn push(&mut self, key: TypeKey) -> DiResult<()> {
        // Circular detection BEFORE pushing the new key
        if self.stack.contains(&key) {
            let mut path = self.path();
            path.push(key.display_name());
            return Err(DiError::Circular(path));
        }

        if self.stack.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(self.stack.len()));
        }

        self.stack.push(key);
        Ok(())
    }
}

/// Singleton constructions in progress, shared by all chains of a container.
///
/// A chain finding a singleton under construction by another chain waits for
/// it to finish. If the owner is itself waiting, directly or through other
/// chains, on a singleton this chain is building, the wait could never end and
/// the request fails as circular instead.
#[derive(Default)]
pub(crate) struct InitTracker {
    state: Mutex<InitState>,
    released: Condvar,
}

#[derive(Default)]
struct InitState {
    /// Key under construction -> chain building it
    owners: HashMap<TypeKey, u64>,
    /// Chain -> key it is waiting for
    waiting: HashMap<u64, TypeKey>,
}

impl InitState {
    /// Follows waits from `owner`; returns the keys waited on when they lead
    /// back to `chain`.
    fn cycle_back_to(&self, owner: u64, chain: u64) -> Option<Vec<TypeKey>> {
        let mut keys = Vec::new();
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            if current == chain {
                return Some(keys);
            }
            let key = *self.waiting.get(&current)?;
            keys.push(key);
            current = *self.owners.get(&key)?;
        }
        None
    }
}

impl InitTracker {
    /// Claims construction of `key` for `chain`, waiting while another chain
    /// holds it. The claim is released on drop.
    pub(crate) fn claim(&self, key: TypeKey, chain: &ResolutionChain) -> DiResult<InitClaim<'_>> {
        let mut state = self.state.lock();
        loop {
            let owner = match state.owners.get(&key).copied() {
                Some(owner) => owner,
                None => {
                    state.owners.insert(key, chain.id);
                    return Ok(InitClaim { tracker: self, key });
                }
            };

            if let Some(waited) = state.cycle_back_to(owner, chain.id) {
                let mut path = chain.path();
                path.extend(waited.iter().map(TypeKey::display_name));
                return Err(DiError::Circular(path));
            }

            state.waiting.insert(chain.id, key);
            self.released.wait(&mut state);
            state.waiting.remove(&chain.id);
        }
    }
}

/// Exclusive right to construct one singleton.
pub(crate) struct InitClaim<'t> {
    tracker: &'t InitTracker,
    key: TypeKey,
}

impl Drop for InitClaim<'_> {
    fn drop(&mut self) {
        self.tracker.state.lock().owners.remove(&self.key);
        self.tracker.released.notify_all();
    }
}
