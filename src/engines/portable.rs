// engines/portable.rs - Pure-Rust collation engine.
//
// Collation elements carry four weights (primary, secondary, tertiary,
// quaternary). Default elements come from canonical decomposition, default
// case folding and kana folding; rule text overlays tailored elements for
// single characters. Sort keys are fixed-width big-endian weights per level
// separated by LEVEL_SEPARATOR, and comparison is sort-key order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::iter;

use caseless::Caseless;
use icu_locale_core::LanguageIdentifier;
use log::{debug, trace};
use memchr::memchr;
use smallvec::SmallVec;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};
use unicode_normalization::UnicodeNormalization;

use crate::engine::{Collator, Engine};
use crate::error::CollationError;
use crate::resolver::Strength;
use crate::tables::rules_for_locale;

// === Weights ===

/// Added to every weight so that its first byte is above the separator.
const WEIGHT_BASE: u32 = 0x0200_0000;
const LEVEL_SEPARATOR: u8 = 0x01;

const COMMON: u32 = 0x05;
const VARIANT: u32 = 0x15;
const UPPER: u32 = 0x1D;
const KATAKANA: u32 = 0x1D;
const MARK_SECONDARY_BASE: u32 = 0x100;

/// Default primaries leave 255 tailoring slots after every code point.
const PRIMARY_SHIFT: u32 = 8;
const PRIMARY_SLOT_MASK: u32 = (1 << PRIMARY_SHIFT) - 1;

const KATAKANA_RANGE: std::ops::RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';
const KANA_OFFSET: u32 = 0x60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CollationElement {
    primary: u32,
    secondary: u32,
    tertiary: u32,
    quaternary: u32,
}

impl CollationElement {
    fn mark(c: char) -> Self {
        CollationElement {
            primary: 0,
            secondary: MARK_SECONDARY_BASE + c as u32,
            tertiary: 0,
            quaternary: 0,
        }
    }

    fn weight(&self, level: usize) -> u32 {
        match level {
            1 => self.primary,
            2 => self.secondary,
            3 => self.tertiary,
            _ => self.quaternary,
        }
    }
}

type Elements = SmallVec<[CollationElement; 16]>;

#[inline]
fn default_primary(c: char) -> u32 {
    (c as u32 + 1) << PRIMARY_SHIFT
}

#[inline]
fn fold_kana(c: char) -> char {
    if KATAKANA_RANGE.contains(&c) {
        char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Default elements for one base (non-mark) character of a decomposition.
fn push_base_elements(c: char, out: &mut Elements) {
    let upper = c.is_uppercase();
    let quaternary = if KATAKANA_RANGE.contains(&c) { KATAKANA } else { COMMON };
    let folded: SmallVec<[char; 3]> = iter::once(c).default_case_fold().collect();
    let variant = folded.len() > 1 || (folded[0] != c && !upper);
    let tertiary = if upper {
        UPPER
    } else if variant {
        VARIANT
    } else {
        COMMON
    };
    for f in folded {
        if is_combining_mark(f) {
            out.push(CollationElement::mark(f));
            continue;
        }
        out.push(CollationElement {
            primary: default_primary(fold_kana(f)),
            secondary: COMMON,
            tertiary,
            quaternary,
        });
    }
}

fn push_default_elements(c: char, out: &mut Elements) {
    decompose_canonical(c, |d| {
        if is_combining_mark(d) {
            out.push(CollationElement::mark(d));
        } else {
            push_base_elements(d, out);
        }
    });
}

// === Rule parsing ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Reset,
    Less(usize),
    Equal,
}

struct RuleToken {
    operator: Operator,
    text: String,
    offset: usize,
}

struct RuleParser<'r> {
    rules: &'r str,
    pos: usize,
}

fn rules_error(offset: usize, message: &str) -> CollationError {
    CollationError::Rules {
        offset,
        message: message.to_string(),
    }
}

fn is_syntax_char(c: char) -> bool {
    matches!(c, '&' | '<' | '=' | '[' | ']')
}

impl<'r> RuleParser<'r> {
    fn new(rules: &'r str) -> Self {
        RuleParser { rules, pos: 0 }
    }

    fn rest(&self) -> &'r str {
        &self.rules[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn next_token(&mut self) -> Result<Option<RuleToken>, CollationError> {
        self.skip_whitespace();
        let offset = self.pos;
        let operator = match self.bump() {
            None => return Ok(None),
            Some('&') => Operator::Reset,
            Some('=') => Operator::Equal,
            Some('<') => {
                let mut level = 1;
                while level < 4 && self.peek() == Some('<') {
                    self.pos += 1;
                    level += 1;
                }
                Operator::Less(level)
            }
            Some('[') => {
                let message = match memchr(b']', self.rest().as_bytes()) {
                    Some(end) => format!("unsupported option [{}]", &self.rest()[..end]),
                    None => String::from("unterminated option"),
                };
                return Err(rules_error(offset, &message));
            }
            Some(_) => return Err(rules_error(offset, "expected '&' or a relation")),
        };
        self.skip_whitespace();
        let text = self.parse_text()?;
        if text.is_empty() {
            return Err(rules_error(self.pos, "missing text after operator"));
        }
        Ok(Some(RuleToken {
            operator,
            text,
            offset,
        }))
    }

    fn parse_text(&mut self) -> Result<String, CollationError> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || is_syntax_char(c) {
                break;
            }
            match c {
                '\'' => {
                    let start = self.pos + 1;
                    let end = memchr(b'\'', &self.rules.as_bytes()[start..])
                        .ok_or_else(|| rules_error(self.pos, "unterminated quote"))?;
                    if end == 0 {
                        text.push('\'');
                    } else {
                        text.push_str(&self.rules[start..start + end]);
                    }
                    self.pos = start + end + 1;
                }
                '\\' => {
                    self.pos += 1;
                    text.push(self.parse_escape()?);
                }
                _ => {
                    self.pos += c.len_utf8();
                    text.push(c);
                }
            }
        }
        Ok(text)
    }

    fn parse_escape(&mut self) -> Result<char, CollationError> {
        let offset = self.pos;
        let digits = match self.bump() {
            Some('u') => 4,
            Some('U') => 8,
            Some(c) => return Ok(c),
            None => return Err(rules_error(offset, "dangling escape")),
        };
        let hex = self
            .rest()
            .get(..digits)
            .ok_or_else(|| rules_error(offset, "short escape"))?;
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| rules_error(offset, "invalid hex in escape"))?;
        self.pos += digits;
        char::from_u32(value).ok_or_else(|| rules_error(offset, "escape is not a scalar value"))
    }
}

// === Tailoring ===

#[derive(Debug, Default, Clone)]
struct Tailoring {
    elements: HashMap<char, CollationElement>,
    primaries: HashSet<u32>,
    secondaries: HashSet<(u32, u32)>,
    tertiaries: HashSet<(u32, u32, u32)>,
    quaternaries: HashSet<CollationElement>,
}

impl Tailoring {
    fn parse(rules: &str) -> Result<Tailoring, CollationError> {
        let mut tailoring = Tailoring::default();
        let mut parser = RuleParser::new(rules);
        let mut previous: Option<CollationElement> = None;

        while let Some(token) = parser.next_token()? {
            match token.operator {
                Operator::Reset => {
                    let mut elements = Elements::new();
                    tailoring.collect_elements(&token.text, &mut elements);
                    previous = elements.last().copied();
                }
                operator => {
                    let anchor = previous
                        .ok_or_else(|| rules_error(token.offset, "relation without reset"))?;
                    let target = single_char(&token.text)
                        .ok_or_else(|| rules_error(token.offset, "contractions are not supported"))?;
                    let element = match operator {
                        Operator::Less(level) => tailoring.allocate(anchor, level, token.offset)?,
                        _ => anchor,
                    };
                    tailoring.elements.insert(target, element);
                    previous = Some(element);
                }
            }
        }
        Ok(tailoring)
    }

    /// Next free element sorting after `anchor` at `level`, with all lower
    /// levels reset to common.
    fn allocate(
        &mut self,
        anchor: CollationElement,
        level: usize,
        offset: usize,
    ) -> Result<CollationElement, CollationError> {
        let mut candidate = anchor;
        loop {
            match level {
                1 => {
                    candidate.primary += 1;
                    candidate.secondary = COMMON;
                    candidate.tertiary = COMMON;
                    candidate.quaternary = COMMON;
                    if candidate.primary & PRIMARY_SLOT_MASK == 0 {
                        return Err(rules_error(offset, "too many primary relations at one reset"));
                    }
                }
                2 => {
                    candidate.secondary += 1;
                    candidate.tertiary = COMMON;
                    candidate.quaternary = COMMON;
                }
                3 => {
                    candidate.tertiary += 1;
                    candidate.quaternary = COMMON;
                }
                _ => candidate.quaternary += 1,
            }
            if !self.is_taken(&candidate, level) {
                break;
            }
        }
        self.primaries.insert(candidate.primary);
        self.secondaries.insert((candidate.primary, candidate.secondary));
        self.tertiaries
            .insert((candidate.primary, candidate.secondary, candidate.tertiary));
        self.quaternaries.insert(candidate);
        Ok(candidate)
    }

    fn is_taken(&self, c: &CollationElement, level: usize) -> bool {
        match level {
            1 => self.primaries.contains(&c.primary),
            2 => self.secondaries.contains(&(c.primary, c.secondary)),
            3 => self.tertiaries.contains(&(c.primary, c.secondary, c.tertiary)),
            _ => self.quaternaries.contains(c),
        }
    }

    fn collect_elements(&self, s: &str, out: &mut Elements) {
        for c in s.nfc() {
            match self.elements.get(&c) {
                Some(&element) => out.push(element),
                None => push_default_elements(c, out),
            }
        }
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.nfc();
    let first = chars.next()?;
    match chars.next() {
        None => Some(first),
        Some(_) => None,
    }
}

// === Engine ===

/// Pure-Rust engine. Stateless; every collator owns its tailoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableEngine;

impl Engine for PortableEngine {
    type Collator = PortableCollator;

    fn name(&self) -> &str {
        "portable"
    }

    fn open_locale(
        &self,
        locale: &LanguageIdentifier,
        prefix: &str,
    ) -> Result<PortableCollator, CollationError> {
        let base = rules_for_locale(locale);
        debug!(
            "portable: opening {} ({} base rule bytes, {} prefix bytes)",
            locale,
            base.len(),
            prefix.len()
        );
        let mut rules = String::with_capacity(prefix.len() + base.len());
        rules.push_str(prefix);
        rules.push_str(base);
        self.open_rules(&rules)
    }

    fn open_rules(&self, rules: &str) -> Result<PortableCollator, CollationError> {
        let tailoring = Tailoring::parse(rules)?;
        trace!("portable: {} tailored characters", tailoring.elements.len());
        Ok(PortableCollator {
            tailoring,
            strength: Strength::Tertiary,
        })
    }

    fn to_upper(&self, s: &str) -> Result<String, CollationError> {
        Ok(s.to_uppercase())
    }

    fn to_lower(&self, s: &str) -> Result<String, CollationError> {
        Ok(s.to_lowercase())
    }
}

/// Collator produced by [`PortableEngine`].
#[derive(Debug, Clone)]
pub struct PortableCollator {
    tailoring: Tailoring,
    strength: Strength,
}

impl PortableCollator {
    /// Number of characters with tailored elements.
    pub fn tailored_len(&self) -> usize {
        self.tailoring.elements.len()
    }

    fn sort_key(&self, s: &str, key: &mut Vec<u8>) {
        let mut elements = Elements::new();
        self.tailoring.collect_elements(s, &mut elements);

        let levels = self.strength.levels();
        for level in 1..=levels.min(4) {
            if level > 1 {
                key.push(LEVEL_SEPARATOR);
            }
            for element in &elements {
                let weight = element.weight(level);
                if weight != 0 {
                    push_weight(key, weight);
                }
            }
        }
        if self.strength == Strength::Identical {
            key.push(LEVEL_SEPARATOR);
            for c in s.nfd() {
                push_weight(key, c as u32);
            }
        }
    }
}

#[inline]
fn push_weight(key: &mut Vec<u8>, weight: u32) {
    key.extend_from_slice(&(weight + WEIGHT_BASE).to_be_bytes());
}

impl Collator for PortableCollator {
    fn set_strength(&mut self, strength: Strength) {
        self.strength = strength;
    }

    fn strength(&self) -> Strength {
        self.strength
    }

    fn compare_utf8(&self, s: &[u8], t: &[u8]) -> Result<Ordering, CollationError> {
        let mut left = Vec::with_capacity(s.len() * 8);
        let mut right = Vec::with_capacity(t.len() * 8);
        self.sort_key(&String::from_utf8_lossy(s), &mut left);
        self.sort_key(&String::from_utf8_lossy(t), &mut right);
        Ok(left.cmp(&right))
    }

    fn write_sort_key(&self, s: &str, key: &mut Vec<u8>) -> Result<(), CollationError> {
        self.sort_key(s, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collator(rules: &str, strength: Strength) -> PortableCollator {
        let mut c = PortableEngine.open_rules(rules).unwrap();
        c.set_strength(strength);
        c
    }

    fn cmp(c: &PortableCollator, a: &str, b: &str) -> Ordering {
        c.compare_utf8(a.as_bytes(), b.as_bytes()).unwrap()
    }

    #[test]
    fn root_levels() {
        let primary = collator("", Strength::Primary);
        assert_eq!(cmp(&primary, "a", "A"), Ordering::Equal);
        assert_eq!(cmp(&primary, "a", "á"), Ordering::Equal);
        assert_eq!(cmp(&primary, "a", "b"), Ordering::Less);

        let secondary = collator("", Strength::Secondary);
        assert_eq!(cmp(&secondary, "a", "A"), Ordering::Equal);
        assert_eq!(cmp(&secondary, "a", "á"), Ordering::Less);

        let tertiary = collator("", Strength::Tertiary);
        assert_eq!(cmp(&tertiary, "a", "A"), Ordering::Less);
        assert_eq!(cmp(&tertiary, "á", "b"), Ordering::Less);
    }

    #[test]
    fn canonical_equivalents_are_equal() {
        let c = collator("", Strength::Identical);
        assert_eq!(cmp(&c, "e\u{301}", "\u{e9}"), Ordering::Equal);
    }

    #[test]
    fn sharp_s_expands() {
        let c = collator("", Strength::Secondary);
        assert_eq!(cmp(&c, "straße", "strasse"), Ordering::Equal);
        let c = collator("", Strength::Tertiary);
        assert_eq!(cmp(&c, "strasse", "straße"), Ordering::Less);
    }

    #[test]
    fn kana_differs_at_quaternary_only() {
        let tertiary = collator("", Strength::Tertiary);
        assert_eq!(cmp(&tertiary, "あ", "ア"), Ordering::Equal);
        let quaternary = collator("", Strength::Quaternary);
        assert_eq!(cmp(&quaternary, "あ", "ア"), Ordering::Less);
    }

    #[test]
    fn primary_tailoring_moves_after_anchor() {
        let c = collator("&z<å<<<Å", Strength::Tertiary);
        assert_eq!(cmp(&c, "z", "å"), Ordering::Less);
        assert_eq!(cmp(&c, "å", "Å"), Ordering::Less);
        assert_eq!(cmp(&c, "a", "å"), Ordering::Less);
        // decomposed input composes to the tailored character
        assert_eq!(cmp(&c, "a\u{30a}", "å"), Ordering::Equal);
        assert_eq!(c.tailored_len(), 2);
    }

    #[test]
    fn secondary_tailoring() {
        let c = collator("&o<<œ", Strength::Primary);
        assert_eq!(cmp(&c, "o", "œ"), Ordering::Equal);
        let c = collator("&o<<œ", Strength::Secondary);
        assert_eq!(cmp(&c, "o", "œ"), Ordering::Less);
        assert_eq!(cmp(&c, "œ", "p"), Ordering::Less);
    }

    #[test]
    fn equal_relation() {
        let c = collator("&a=@", Strength::Quaternary);
        assert_eq!(cmp(&c, "a", "@"), Ordering::Equal);
        let c = collator("&a=@", Strength::Identical);
        assert_ne!(cmp(&c, "a", "@"), Ordering::Equal);
    }

    #[test]
    fn second_reset_on_same_anchor_goes_after() {
        let c = collator("&a<x &a<y", Strength::Primary);
        assert_eq!(cmp(&c, "a", "x"), Ordering::Less);
        assert_eq!(cmp(&c, "x", "y"), Ordering::Less);
        assert_eq!(cmp(&c, "y", "b"), Ordering::Less);
    }

    #[test]
    fn escapes_and_quotes() {
        let c = collator("&\\u0061<'x'<\\U0001F436", Strength::Primary);
        assert_eq!(cmp(&c, "a", "x"), Ordering::Less);
        assert_eq!(cmp(&c, "x", "🐶"), Ordering::Less);
        assert_eq!(cmp(&c, "🐶", "b"), Ordering::Less);
    }

    #[test]
    fn malformed_rules() {
        let cases = [
            ("<a", "relation without reset"),
            ("&a<", "missing text after operator"),
            ("&a<xy", "contractions are not supported"),
            ("[backwards 2]&a<b", "unsupported option [backwards 2]"),
            ("&a<'x", "unterminated quote"),
            ("&\\u00G1<b", "invalid hex in escape"),
            ("a<b", "expected '&' or a relation"),
        ];
        for (rules, expected) in cases {
            match PortableEngine.open_rules(rules) {
                Err(CollationError::Rules { message, .. }) => assert_eq!(message, expected, "{}", rules),
                other => panic!("{}: expected rules error, got {:?}", rules, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn sort_key_levels() {
        let c = collator("", Strength::Primary);
        let mut key = Vec::new();
        c.write_sort_key("ab", &mut key).unwrap();
        assert_eq!(key.len(), 8);
        assert!(!key.contains(&LEVEL_SEPARATOR));

        let c = collator("", Strength::Tertiary);
        let mut key = Vec::new();
        c.write_sort_key("ab", &mut key).unwrap();
        assert_eq!(key.iter().filter(|&&b| b == LEVEL_SEPARATOR).count(), 2);
        assert_eq!(key.len(), 8 * 3 + 2);
    }

    #[test]
    fn empty_string_sorts_first() {
        let c = collator("", Strength::Identical);
        assert_eq!(cmp(&c, "", "a"), Ordering::Less);
        assert_eq!(cmp(&c, "", ""), Ordering::Equal);
    }

    #[test]
    fn locale_rules() {
        let nb = LanguageIdentifier::try_from_str("nb-NO").unwrap();
        let mut c = PortableEngine.open_locale(&nb, "").unwrap();
        c.set_strength(Strength::Primary);
        assert_eq!(cmp(&c, "å", "z"), Ordering::Greater);

        let de = LanguageIdentifier::try_from_str("de").unwrap();
        let mut c = PortableEngine.open_locale(&de, "").unwrap();
        c.set_strength(Strength::Primary);
        assert_eq!(cmp(&c, "å", "z"), Ordering::Less);
    }

    #[test]
    fn case_mapping() {
        assert_eq!(PortableEngine.to_upper("straße").unwrap(), "STRASSE");
        assert_eq!(PortableEngine.to_lower("ÅSE").unwrap(), "åse");
    }
}
