// engine.rs - Boundary with the collation engine.
//
// The engine owns every linguistic decision: weights, normalization and
// case mapping. This crate only configures collators and moves bytes.

use std::cmp::Ordering;

use icu_locale_core::LanguageIdentifier;

use crate::error::CollationError;
use crate::resolver::Strength;

/// A collation engine: a factory for collators plus case mapping.
pub trait Engine {
    type Collator: Collator;

    /// Short engine name for diagnostics.
    fn name(&self) -> &str;

    /// Open a collator for `locale`, with `prefix` rules placed ahead of the
    /// locale's own tailoring. An empty prefix opens the plain locale collator.
    fn open_locale(
        &self,
        locale: &LanguageIdentifier,
        prefix: &str,
    ) -> Result<Self::Collator, CollationError>;

    /// Open a collator from rule text.
    fn open_rules(&self, rules: &str) -> Result<Self::Collator, CollationError>;

    /// Full Unicode uppercase mapping.
    fn to_upper(&self, s: &str) -> Result<String, CollationError>;

    /// Full Unicode lowercase mapping.
    fn to_lower(&self, s: &str) -> Result<String, CollationError>;
}

/// One configured collator.
pub trait Collator {
    fn set_strength(&mut self, strength: Strength);

    fn strength(&self) -> Strength;

    /// Compare two UTF-8 byte ranges. Ill-formed sequences compare as U+FFFD.
    fn compare_utf8(&self, s: &[u8], t: &[u8]) -> Result<Ordering, CollationError>;

    /// Append the complete sort key of `s` to `key`.
    fn write_sort_key(&self, s: &str, key: &mut Vec<u8>) -> Result<(), CollationError>;
}
