// charset.rs - Host charset descriptor and sort-key flags.

use bitflags::bitflags;

/// The host's description of a charset/collation, read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetInfo {
    /// Stable numeric id; the cache key.
    pub number: u32,
    /// Collation name, used for diagnostics only.
    pub coll_name: String,
    /// Locale tag or free-form tailoring comment.
    pub comment: String,
    /// Comparison levels: 1..=4, anything else means identical.
    pub levels_for_compare: u32,
}

impl CharsetInfo {
    pub fn new(number: u32, comment: &str, levels_for_compare: u32) -> Self {
        CharsetInfo {
            number,
            coll_name: format!("utf8mb4_icu_{}", number),
            comment: comment.to_string(),
            levels_for_compare,
        }
    }

    pub fn with_name(mut self, coll_name: &str) -> Self {
        self.coll_name = coll_name.to_string();
        self
    }
}

bitflags! {
    /// Flags the host passes to sort-key generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct XfrmFlags: u32 {
        /// Zero-fill the rest of the destination when the key fits.
        const PAD_TO_MAXLEN = 0x0000_0080;
        /// Host hint that the key may be compared by prefix; accepted, no effect.
        const NOPAD = 0x0000_0100;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name() {
        let cs = CharsetInfo::new(324, "nb_NO", 2);
        assert_eq!(cs.coll_name, "utf8mb4_icu_324");
        assert_eq!(cs.with_name("nb_ai_ci").coll_name, "nb_ai_ci");
    }

    #[test]
    fn unknown_flag_bits_are_dropped() {
        let flags = XfrmFlags::from_bits_truncate(0xFFFF_FFFF);
        assert!(flags.contains(XfrmFlags::PAD_TO_MAXLEN));
        assert_eq!(flags.bits(), 0x180);
    }
}
