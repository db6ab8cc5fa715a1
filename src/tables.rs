// tables.rs - Built-in base rules and the charset id table.
//
// Rule text uses the engine rule syntax: `&` resets, `<` `<<` `<<<`
// relations (primary, secondary, tertiary) and `=` for equal.

use icu_locale_core::LanguageIdentifier;

/// Norwegian Bokmål.
pub const RULES_NB_NO: &str = "&d<<đ<<<Đ<<ð<<<Ð\
&y<<ü<<<Ü<<ű<<<Ű\
&z<æ<<<Æ<<ä<<<Ä<ø<<<Ø<<ö<<<Ö<<ő<<<Ő<<œ<<<Œ<å<<<Å";

/// English (United States). Root order.
pub const RULES_EN_US: &str = "";

/// French (France).
pub const RULES_FR_FR: &str = "&c<<ç<<<Ç\
&e<<é<<<É<<è<<<È<<ê<<<Ê<<ë<<<Ë\
&o<<œ<<<Œ";

/// Simplified Chinese: common characters in pinyin order ahead of other scripts.
pub const RULES_ZH_HANS: &str = "&z<阿<啊<爱<安<八<巴<白<百<北<本<比<不<才<长<出<大<的<地<东<都";

/// Japanese: half-width katakana as tertiary variants of full-width.
pub const RULES_JA_JP: &str = "&ア<<<ｱ&イ<<<ｲ&ウ<<<ｳ&エ<<<ｴ&オ<<<ｵ\
&カ<<<ｶ&キ<<<ｷ&ク<<<ｸ&ケ<<<ｹ&コ<<<ｺ&ー<<<ｰ";

// === Charset ids ===

pub const CHARSET_NB_NO: u32 = 324;
pub const CHARSET_EN_US: u32 = 325;
pub const CHARSET_EN_US_ALT: u32 = 326;
pub const CHARSET_FR_FR: u32 = 327;
pub const CHARSET_ZH_HANS: u32 = 328;
pub const CHARSET_JA_JP: u32 = 329;
pub const CHARSET_JA_JP_ALT: u32 = 330;

/// Charset ids the table-driven resolver knows, with their base rules.
pub static CHARSET_RULES: [(u32, &str); 7] = [
    (CHARSET_NB_NO, RULES_NB_NO),
    (CHARSET_EN_US, RULES_EN_US),
    (CHARSET_EN_US_ALT, RULES_EN_US),
    (CHARSET_FR_FR, RULES_FR_FR),
    (CHARSET_ZH_HANS, RULES_ZH_HANS),
    (CHARSET_JA_JP, RULES_JA_JP),
    (CHARSET_JA_JP_ALT, RULES_JA_JP),
];

/// Base rules for a known charset id.
pub fn rules_for_charset(id: u32) -> Option<&'static str> {
    CHARSET_RULES
        .iter()
        .find(|&&(known, _)| known == id)
        .map(|&(_, rules)| rules)
}

/// Base rules for a language subtag. Languages without tailorings use root order.
pub fn rules_for_language(language: &str) -> &'static str {
    match language {
        "nb" | "nn" | "no" => RULES_NB_NO,
        "fr" => RULES_FR_FR,
        "zh" => RULES_ZH_HANS,
        "ja" => RULES_JA_JP,
        _ => RULES_EN_US,
    }
}

/// Base rules for a full locale. Traditional Chinese, named by the `Hant`
/// script or implied by a TW/HK/MO region, has no built-in tailoring and
/// uses root order instead of the Simplified pinyin rules.
pub fn rules_for_locale(locale: &LanguageIdentifier) -> &'static str {
    let language = locale.language.as_str();
    if language == "zh" && is_traditional_chinese(locale) {
        return RULES_EN_US;
    }
    rules_for_language(language)
}

fn is_traditional_chinese(locale: &LanguageIdentifier) -> bool {
    match &locale.script {
        Some(script) => script.as_str() == "Hant",
        None => matches!(
            locale.region.as_ref().map(|r| r.as_str()),
            Some("TW" | "HK" | "MO")
        ),
    }
}
