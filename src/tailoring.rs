// tailoring.rs - Tailoring prefix composition.
//
// A tailoring prefix is a reset anchor followed by up to five ordering
// blocks. It is prepended to every charset's base rules, so the exact text
// decides sort-key bytes and therefore on-disk index compatibility: the
// blocks are append-only and are always taken in index order.

use std::fmt;

use crate::error::CollationError;

/// Reset at the last assignable code point, so that every block sorts after
/// all default primaries. The anchor is U+10FFFD as one scalar, not U+10FFF
/// followed by `D`; keys built with the latter differ.
pub const RESET_ANCHOR: &str = "&\u{10FFFD}";

/// Ordering blocks compensating for root-order drift between engine
/// releases. Block `n` is only meaningful after blocks `0..n`.
pub const ORDERING_BLOCKS: [&str; 5] = [
    "<🐶<🐱<🐭<🐹<🐰<🦊<🐻<🐼<🐨<🐯<🦁<🐮<🐷<🦄<🐴<🐗<🐺<🐸<🐒<🦍",
    "<🦌<🦒<🦓<🦏<🦛<🦘<🦙<🦞<🦩<🦚<🦜<🦢<🦆<🦉<🦔<🦇<🦋<🐜<🐌<🦑",
    "<🦐<🦀<🐍<🦎<🐢<🦕<🦖<🦟<🦗<🕷<🕸<🦂<🦠<🦨<🦦<🦥<🦡<🦧<🐊<🐅",
    "<🐆<🦈<🌵<🌴<🌲<🌳<🌺<🌸<🌻<🌼<🌷<🍂<🍁<🍄<🍀<🌿<🌱<🍃<🌾<🌰",
    "<🍇<🍈<🍉<🍊<🍋<🍌<🍍<🍎<🍏<🍐<🍑<🍒<🍓<🥝<🍅<🥑<🍆<🥔<🥕<🌽",
];

/// Largest prefix size the composer recognises.
pub const MAX_TAILORING_PREFIX_SIZE: u8 = ORDERING_BLOCKS.len() as u8;

/// Prefix size used when the configuration does not name one.
pub const DEFAULT_TAILORING_PREFIX_SIZE: u8 = 0;

/// A validated number of ordering blocks (0..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TailoringPrefixSize(u8);

impl TailoringPrefixSize {
    /// Validate a prefix size. Anything above five is rejected.
    pub fn new(size: u8) -> Result<Self, CollationError> {
        if size > MAX_TAILORING_PREFIX_SIZE {
            return Err(CollationError::InvalidPrefixSize(size));
        }
        Ok(TailoringPrefixSize(size))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Compose the prefix text for this size.
    pub fn compose(self) -> String {
        build_tailoring_prefix(self.0)
    }
}

impl Default for TailoringPrefixSize {
    fn default() -> Self {
        TailoringPrefixSize(DEFAULT_TAILORING_PREFIX_SIZE)
    }
}

impl fmt::Display for TailoringPrefixSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the reset anchor plus the first `size` ordering blocks.
///
/// `size == 0` yields an empty rule string.
///
/// # Panics
///
/// Panics when `size > 5`. A wrong prefix silently changes every sort key,
/// so an unrecognised size is never truncated or wrapped.
pub fn build_tailoring_prefix(size: u8) -> String {
    assert!(
        size <= MAX_TAILORING_PREFIX_SIZE,
        "unsupported tailoring prefix size {}",
        size
    );
    if size == 0 {
        return String::new();
    }
    let blocks = &ORDERING_BLOCKS[..size as usize];
    let mut prefix =
        String::with_capacity(RESET_ANCHOR.len() + blocks.iter().map(|b| b.len()).sum::<usize>());
    prefix.push_str(RESET_ANCHOR);
    for block in blocks {
        prefix.push_str(block);
    }
    prefix
}

/// Prepend the tailoring prefix of `size` to `base` rules.
pub fn compose_rules(size: TailoringPrefixSize, base: &str) -> String {
    let mut rules = size.compose();
    rules.push_str(base);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_zero_is_empty() {
        assert_eq!(build_tailoring_prefix(0), "");
    }

    #[test]
    fn prefix_starts_with_anchor_and_keeps_block_order() {
        for size in 1..=5u8 {
            let prefix = build_tailoring_prefix(size);
            assert!(prefix.starts_with(RESET_ANCHOR));
            let mut expected = String::from(RESET_ANCHOR);
            for block in &ORDERING_BLOCKS[..size as usize] {
                expected.push_str(block);
            }
            assert_eq!(prefix, expected);
        }
    }

    #[test]
    fn anchor_is_a_single_scalar() {
        let chars: Vec<char> = RESET_ANCHOR.chars().collect();
        assert_eq!(chars, ['&', '\u{10FFFD}']);
    }

    #[test]
    fn prefixes_nest() {
        for size in 1..5u8 {
            let shorter = build_tailoring_prefix(size);
            let longer = build_tailoring_prefix(size + 1);
            assert!(longer.starts_with(&shorter));
            assert!(longer.len() > shorter.len());
        }
    }

    #[test]
    fn prefix_is_deterministic() {
        for size in 0..=5u8 {
            assert_eq!(build_tailoring_prefix(size), build_tailoring_prefix(size));
        }
    }

    #[test]
    fn blocks_hold_twenty_relations() {
        for block in ORDERING_BLOCKS {
            assert_eq!(block.matches('<').count(), 20);
            assert_eq!(block.chars().filter(|&c| c != '<').count(), 20);
        }
    }

    #[test]
    #[should_panic(expected = "unsupported tailoring prefix size 6")]
    fn size_six_panics() {
        build_tailoring_prefix(6);
    }

    #[test]
    #[should_panic]
    fn size_max_panics() {
        build_tailoring_prefix(u8::MAX);
    }

    #[test]
    fn validated_size() {
        assert_eq!(TailoringPrefixSize::new(5).unwrap().get(), 5);
        assert_eq!(
            TailoringPrefixSize::new(6),
            Err(CollationError::InvalidPrefixSize(6))
        );
        assert_eq!(TailoringPrefixSize::default().get(), DEFAULT_TAILORING_PREFIX_SIZE);
    }

    #[test]
    fn compose_rules_prepends() {
        let size = TailoringPrefixSize::new(1).unwrap();
        let rules = compose_rules(size, "&z<æ");
        assert!(rules.starts_with(RESET_ANCHOR));
        assert!(rules.ends_with("&z<æ"));
    }
}
