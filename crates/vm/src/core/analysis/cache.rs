use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy::primitives::{keccak256, B256};
use hashbrown::HashMap;
use tracing::trace;

use super::{analyze_with, AnalyzedProgram, BlockGranularity};
use crate::core::revision::Revision;

type CacheKey = (B256, Revision, BlockGranularity);

/// A bounded, thread-safe cache of [`AnalyzedProgram`]s keyed by code hash and revision.
///
/// A capacity of zero disables caching. Once the cache is full, newly analyzed programs are
/// returned to the caller without being stored.
///
/// ```
/// use std::sync::Arc;
/// use bifrost_vm::core::{analysis::{cache::ProgramCache, BlockGranularity}, revision::Revision};
///
/// let cache = ProgramCache::new(16);
/// let first = cache.get_or_analyze(Revision::Cancun, BlockGranularity::Block, &[0x00]);
/// let second = cache.get_or_analyze(Revision::Cancun, BlockGranularity::Block, &[0x00]);
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ProgramCache {
    capacity: usize,
    programs: RwLock<HashMap<CacheKey, Arc<AnalyzedProgram>>>,
}

impl ProgramCache {
    /// Creates an empty cache holding at most `capacity` programs.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, programs: RwLock::new(HashMap::new()) }
    }

    /// The maximum number of cached programs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of cached programs.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache holds no programs.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drops every cached program.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns the cached program for `code`, analyzing and caching it on a miss.
    pub fn get_or_analyze(
        &self,
        revision: Revision,
        granularity: BlockGranularity,
        code: &[u8],
    ) -> Arc<AnalyzedProgram> {
        if self.capacity == 0 {
            return Arc::new(analyze_with(revision, code, granularity));
        }

        let key = (keccak256(code), revision, granularity);
        if let Some(program) = self.read().get(&key) {
            trace!(code_hash = %key.0, revision = %revision, "program cache hit");
            return Arc::clone(program);
        }

        trace!(code_hash = %key.0, revision = %revision, "program cache miss");
        let program = Arc::new(analyze_with(revision, code, granularity));

        let mut programs = self.write();
        if let Some(existing) = programs.get(&key) {
            // another thread analyzed the same code in the meantime
            return Arc::clone(existing);
        }
        if programs.len() < self.capacity {
            programs.insert(key, Arc::clone(&program));
        }
        program
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<AnalyzedProgram>>> {
        self.programs.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<AnalyzedProgram>>> {
        self.programs.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
