// context.rs - Per-worker collation context.
//
// A `CollationContext` owns everything one worker thread needs: the
// engine, the deployment config, its collator cache and a scratch buffer
// for sort keys. Every string operation goes through a context, so the
// cache's lifetime is visible at each call site.

use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace, warn};

use crate::bridge::{copy_sort_key, copy_truncated, decode_utf8};
use crate::cache::{CollationHandle, CollatorCache};
use crate::charset::{CharsetInfo, XfrmFlags};
use crate::config::CollationConfig;
use crate::engine::{Collator, Engine};
use crate::error::CollationError;

/// Engine, config, cache and status for one worker.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use ferrocoll::prelude::*;
///
/// let mut ctx = CollationContext::new(PortableEngine, CollationConfig::default());
/// let nb = CharsetInfo::new(324, "nb_NO", 3);
/// assert_eq!(ctx.compare(&nb, "z".as_bytes(), "å".as_bytes()).unwrap(), Ordering::Less);
/// ```
pub struct CollationContext<E: Engine> {
    engine: E,
    config: CollationConfig,
    cache: CollatorCache<E::Collator>,
    status: Option<CollationError>,
    key: Vec<u8>,
}

impl<E: Engine> CollationContext<E> {
    pub fn new(engine: E, config: CollationConfig) -> Self {
        CollationContext {
            engine,
            config,
            cache: CollatorCache::new(),
            status: None,
            key: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &CollationConfig {
        &self.config
    }

    pub fn cache(&self) -> &CollatorCache<E::Collator> {
        &self.cache
    }

    /// The cached handle for `cs`, built on first use.
    pub fn handle(
        &mut self,
        cs: &CharsetInfo,
    ) -> Result<&CollationHandle<E::Collator>, CollationError> {
        self.cache.get_or_create(&self.engine, &self.config, cs)
    }

    // === Lifecycle ===

    /// Build the handle for `cs` now instead of on first use.
    pub fn init(&mut self, cs: &CharsetInfo) -> Result<(), CollationError> {
        self.handle(cs).map(|_| ())
    }

    /// Release every cached handle. Returns how many were released.
    pub fn uninit(&mut self) -> usize {
        self.key = Vec::new();
        self.cache.teardown()
    }

    // === String operations ===

    /// Uppercase `src` into `dst`, truncating at a character boundary.
    /// Returns bytes written.
    pub fn case_up(
        &mut self,
        cs: &CharsetInfo,
        src: &[u8],
        dst: &mut [u8],
    ) -> Result<usize, CollationError> {
        let mapped = self.engine.to_upper(&decode_utf8(src))?;
        Ok(self.finish_case_map("case_up", cs, &mapped, dst))
    }

    /// Lowercase `src` into `dst`, truncating at a character boundary.
    /// Returns bytes written.
    pub fn case_down(
        &mut self,
        cs: &CharsetInfo,
        src: &[u8],
        dst: &mut [u8],
    ) -> Result<usize, CollationError> {
        let mapped = self.engine.to_lower(&decode_utf8(src))?;
        Ok(self.finish_case_map("case_down", cs, &mapped, dst))
    }

    fn finish_case_map(&self, op: &str, cs: &CharsetInfo, mapped: &str, dst: &mut [u8]) -> usize {
        let written = copy_truncated(mapped, dst);
        trace!("{}: charset {}, {} of {} bytes", op, cs.number, written, mapped.len());
        if written < mapped.len() {
            warn!(
                "{}: charset {}: output truncated to {} bytes, {} needed",
                op,
                cs.number,
                written,
                mapped.len()
            );
        }
        written
    }

    /// Compare two UTF-8 byte ranges under `cs`'s collator.
    pub fn compare(
        &mut self,
        cs: &CharsetInfo,
        s: &[u8],
        t: &[u8],
    ) -> Result<Ordering, CollationError> {
        let handle = self.cache.get_or_create(&self.engine, &self.config, cs)?;
        let ordering = handle.collator().compare_utf8(s, t)?;
        trace!(
            "compare: charset {}, {} vs {} bytes: {:?}",
            cs.number,
            s.len(),
            t.len(),
            ordering
        );
        Ok(ordering)
    }

    /// Write the sort key of `src` into `dst`.
    ///
    /// When the key does not fit, `dst` is left untouched and the required
    /// length (greater than `dst.len()`) is returned. Otherwise returns the
    /// key length, or `dst.len()` under `PAD_TO_MAXLEN`.
    pub fn sort_key(
        &mut self,
        cs: &CharsetInfo,
        src: &[u8],
        dst: &mut [u8],
        flags: XfrmFlags,
    ) -> Result<usize, CollationError> {
        let text = decode_utf8(src);
        let handle = self.cache.get_or_create(&self.engine, &self.config, cs)?;
        self.key.clear();
        handle.collator().write_sort_key(&text, &mut self.key)?;
        let len = copy_sort_key(&self.key, dst, flags);
        trace!(
            "sort_key: charset {}, {} source bytes, key {} bytes",
            cs.number,
            src.len(),
            self.key.len()
        );
        if len > dst.len() {
            warn!(
                "sort_key: charset {}: {} byte buffer, {} needed",
                cs.number,
                dst.len(),
                len
            );
        }
        Ok(len)
    }

    // === Status ===

    /// The last error recorded by a host vtable call, if any.
    pub fn status(&self) -> Option<&CollationError> {
        self.status.as_ref()
    }

    /// Take and clear the recorded error.
    pub fn take_status(&mut self) -> Option<CollationError> {
        self.status.take()
    }

    pub(crate) fn record_status(&mut self, err: CollationError) {
        debug!("recording status {}: {}", err.code(), err);
        self.status = Some(err);
    }
}

impl<E: Engine> fmt::Debug for CollationContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollationContext")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("status", &self.status)
            .finish()
    }
}

impl<E: Engine + Default> Default for CollationContext<E> {
    fn default() -> Self {
        CollationContext::new(E::default(), CollationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::PortableEngine;

    fn ctx() -> CollationContext<PortableEngine> {
        CollationContext::default()
    }

    #[test]
    fn case_up_sharp_s() {
        let mut ctx = ctx();
        let cs = CharsetInfo::new(325, "en_US", 3);
        let mut dst = [0u8; 16];
        let n = ctx.case_up(&cs, "straße".as_bytes(), &mut dst).unwrap();
        assert_eq!(&dst[..n], b"STRASSE");
        // case mapping does not build collators
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn case_down_truncates() {
        let mut ctx = ctx();
        let cs = CharsetInfo::new(325, "en_US", 3);
        let mut dst = [0u8; 3];
        // "ÄÖ" lowercases to 4 bytes; only one whole character fits
        let n = ctx.case_down(&cs, "ÄÖ".as_bytes(), &mut dst).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&dst[..n], "ä".as_bytes());
    }

    #[test]
    fn init_builds_and_uninit_releases() {
        let mut ctx = ctx();
        ctx.init(&CharsetInfo::new(327, "fr_FR", 2)).unwrap();
        ctx.init(&CharsetInfo::new(328, "zh_Hans", 3)).unwrap();
        assert_eq!(ctx.cache().len(), 2);
        assert_eq!(ctx.uninit(), 2);
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn init_reports_unknown_charset() {
        let mut ctx = ctx();
        let err = ctx.init(&CharsetInfo::new(9, "xx", 3)).unwrap_err();
        assert_eq!(err, CollationError::UnknownCharset(9));
    }

    #[test]
    fn sort_key_reports_required_length() {
        let mut ctx = ctx();
        let cs = CharsetInfo::new(325, "en_US", 3);
        let mut big = [0u8; 256];
        let required = ctx.sort_key(&cs, b"abc", &mut big, XfrmFlags::empty()).unwrap();
        assert!(required > 0);

        let mut small = vec![0x5Au8; required - 1];
        let reported = ctx.sort_key(&cs, b"abc", &mut small, XfrmFlags::empty()).unwrap();
        assert_eq!(reported, required);
        assert!(small.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn status_round_trip() {
        let mut ctx = ctx();
        assert!(ctx.status().is_none());
        ctx.record_status(CollationError::Reentrant);
        assert_eq!(ctx.status(), Some(&CollationError::Reentrant));
        assert_eq!(ctx.take_status(), Some(CollationError::Reentrant));
        assert!(ctx.status().is_none());
    }
}
