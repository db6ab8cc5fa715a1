// cache.rs - Collation handles and the caches that own them.
//
// A handle is built once per (cache, charset id) and released only when
// its cache is torn down or dropped. `CollatorCache` is the per-thread
// variant: it lives inside a worker's context, needs no locking, and hands
// out borrows so a handle cannot outlive a teardown. `SharedCollatorCache`
// is the process-wide variant with at-most-once construction per id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::charset::CharsetInfo;
use crate::config::CollationConfig;
use crate::engine::{Collator, Engine};
use crate::error::CollationError;
use crate::resolver::{resolve, RuleSource, Strength};
use crate::tailoring::compose_rules;

/// A configured collator for one charset.
#[derive(Debug)]
pub struct CollationHandle<C> {
    charset: u32,
    collator: C,
}

impl<C: Collator> CollationHandle<C> {
    /// Resolve `cs`, compose its rules, open and configure a collator.
    pub fn build<E>(
        engine: &E,
        config: &CollationConfig,
        cs: &CharsetInfo,
    ) -> Result<Self, CollationError>
    where
        E: Engine<Collator = C>,
    {
        let resolution = resolve(cs, config.strategy)?;
        let prefix_size = config.tailoring_prefix_size;
        let mut collator = match &resolution.source {
            RuleSource::Rules(base) => engine.open_rules(&compose_rules(prefix_size, base))?,
            RuleSource::Locale(locale) => engine.open_locale(locale, &prefix_size.compose())?,
        };
        collator.set_strength(resolution.strength);
        debug!(
            "built {} collator for charset {} ({}): {:?} strategy, strength {}, prefix {}",
            engine.name(),
            cs.number,
            cs.coll_name,
            config.strategy,
            resolution.strength,
            prefix_size
        );
        Ok(CollationHandle {
            charset: cs.number,
            collator,
        })
    }

    pub fn charset(&self) -> u32 {
        self.charset
    }

    pub fn strength(&self) -> Strength {
        self.collator.strength()
    }

    pub fn collator(&self) -> &C {
        &self.collator
    }
}

// === Per-thread cache ===

/// Charset id to handle map owned by a single worker.
#[derive(Debug)]
pub struct CollatorCache<C> {
    handles: HashMap<u32, CollationHandle<C>>,
    builds: u64,
}

impl<C: Collator> CollatorCache<C> {
    pub fn new() -> Self {
        CollatorCache {
            handles: HashMap::new(),
            builds: 0,
        }
    }

    /// Return the handle for `cs`, building it on first use.
    ///
    /// A failed build leaves the cache unchanged.
    pub fn get_or_create<E>(
        &mut self,
        engine: &E,
        config: &CollationConfig,
        cs: &CharsetInfo,
    ) -> Result<&CollationHandle<C>, CollationError>
    where
        E: Engine<Collator = C>,
    {
        match self.handles.entry(cs.number) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let handle = CollationHandle::build(engine, config, cs)?;
                self.builds += 1;
                Ok(entry.insert(handle))
            }
        }
    }

    pub fn get(&self, charset: u32) -> Option<&CollationHandle<C>> {
        self.handles.get(&charset)
    }

    pub fn contains(&self, charset: u32) -> bool {
        self.handles.contains_key(&charset)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Collators built over the cache's lifetime, teardowns included.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Release every handle. Returns how many were released.
    pub fn teardown(&mut self) -> usize {
        let released = self.handles.len();
        self.handles.clear();
        debug!("collator cache teardown: released {} handles", released);
        released
    }
}

impl<C: Collator> Default for CollatorCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

// === Process-wide cache ===

/// Charset id to handle map shared by all threads.
///
/// Lookups take a read lock. A miss takes the upgradable lock, re-checks,
/// builds while readers continue, then upgrades to publish. Only one
/// upgradable holder exists at a time, so each id is built at most once.
#[derive(Debug)]
pub struct SharedCollatorCache<C> {
    handles: RwLock<HashMap<u32, Arc<CollationHandle<C>>>>,
}

impl<C: Collator + Send + Sync> SharedCollatorCache<C> {
    pub fn new() -> Self {
        SharedCollatorCache {
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_create<E>(
        &self,
        engine: &E,
        config: &CollationConfig,
        cs: &CharsetInfo,
    ) -> Result<Arc<CollationHandle<C>>, CollationError>
    where
        E: Engine<Collator = C>,
    {
        if let Some(handle) = self.handles.read().get(&cs.number) {
            return Ok(Arc::clone(handle));
        }
        let handles = self.handles.upgradable_read();
        if let Some(handle) = handles.get(&cs.number) {
            return Ok(Arc::clone(handle));
        }
        let handle = Arc::new(CollationHandle::build(engine, config, cs)?);
        let mut handles = RwLockUpgradableReadGuard::upgrade(handles);
        handles.insert(cs.number, Arc::clone(&handle));
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }

    /// Drop the cache's references. Handles still held by callers are
    /// released when the last of them returns.
    pub fn teardown(&self) -> usize {
        let mut handles = self.handles.write();
        let released = handles.len();
        handles.clear();
        debug!("shared collator cache teardown: released {} handles", released);
        released
    }
}

impl<C: Collator + Send + Sync> Default for SharedCollatorCache<C> {
    fn default() -> Self {
        Self::new()
    }
}
