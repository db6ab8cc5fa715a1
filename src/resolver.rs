// resolver.rs - Charset id to base rules/locale and comparison strength.

use std::fmt;

use icu_locale_core::LanguageIdentifier;

use crate::charset::CharsetInfo;
use crate::error::CollationError;
use crate::tables::rules_for_charset;

/// Comparison strength, from cheapest to most discriminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strength {
    /// Accent and case insensitive.
    Primary,
    /// Accent sensitive, case insensitive.
    Secondary,
    /// Accent and case sensitive.
    Tertiary,
    /// Adds kana (script variant) sensitivity.
    Quaternary,
    /// Code point equivalence after canonical decomposition.
    Identical,
}

impl Strength {
    /// Map the host's "levels for compare" to a strength. Total: every value
    /// outside 1..=4 selects `Identical`.
    pub fn from_levels(levels: u32) -> Strength {
        match levels {
            1 => Strength::Primary,
            2 => Strength::Secondary,
            3 => Strength::Tertiary,
            4 => Strength::Quaternary,
            _ => Strength::Identical,
        }
    }

    /// Number of weight levels a sort key carries at this strength.
    pub fn levels(self) -> usize {
        match self {
            Strength::Primary => 1,
            Strength::Secondary => 2,
            Strength::Tertiary => 3,
            Strength::Quaternary => 4,
            Strength::Identical => 5,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strength::Primary => "primary",
            Strength::Secondary => "secondary",
            Strength::Tertiary => "tertiary",
            Strength::Quaternary => "quaternary",
            Strength::Identical => "identical",
        };
        f.write_str(name)
    }
}

/// How a charset's base ordering is found. One per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionStrategy {
    /// The descriptor's comment is a locale tag handed to the engine.
    Locale,
    /// The charset id selects a built-in rule constant.
    #[default]
    Table,
}

impl std::str::FromStr for ResolutionStrategy {
    type Err = CollationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "locale" => Ok(ResolutionStrategy::Locale),
            "table" => Ok(ResolutionStrategy::Table),
            _ => Err(CollationError::InvalidConfig {
                key: String::from("strategy"),
                value: s.to_string(),
            }),
        }
    }
}

/// Where the base ordering comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Locale(LanguageIdentifier),
    Rules(&'static str),
}

/// Result of resolving a charset descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub source: RuleSource,
    pub strength: Strength,
}

/// Resolve a descriptor to its base ordering and strength.
///
/// Table-driven resolution rejects ids outside the table; locale-driven
/// resolution rejects tags that are not well-formed. Neither falls back
/// to a default.
pub fn resolve(
    cs: &CharsetInfo,
    strategy: ResolutionStrategy,
) -> Result<Resolution, CollationError> {
    let source = match strategy {
        ResolutionStrategy::Table => match rules_for_charset(cs.number) {
            Some(rules) => RuleSource::Rules(rules),
            None => return Err(CollationError::UnknownCharset(cs.number)),
        },
        ResolutionStrategy::Locale => RuleSource::Locale(parse_locale(&cs.comment)?),
    };
    Ok(Resolution {
        source,
        strength: Strength::from_levels(cs.levels_for_compare),
    })
}

/// Parse a locale tag. Accepts ICU-style underscores and `root`.
pub fn parse_locale(tag: &str) -> Result<LanguageIdentifier, CollationError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(CollationError::InvalidLocale {
            tag: tag.to_string(),
            message: String::from("empty locale tag"),
        });
    }
    if trimmed.eq_ignore_ascii_case("root") {
        return Ok(LanguageIdentifier::UNKNOWN);
    }
    let normalized = trimmed.replace('_', "-");
    LanguageIdentifier::try_from_str(&normalized).map_err(|e| CollationError::InvalidLocale {
        tag: tag.to_string(),
        message: e.to_string(),
    })
}
