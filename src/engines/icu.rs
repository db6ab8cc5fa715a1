// engines/icu.rs - ICU4C collation engine (gated on `icu` feature)
//
// Minimal surface over csrc/icu_shim.c: open from locale or rules, set
// strength, compare UTF-8, sort keys, case mapping. Collators are closed by
// Drop, exactly once.

#![allow(non_camel_case_types)]

use std::cmp::Ordering;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr::{self, NonNull};

use icu_locale_core::LanguageIdentifier;
use log::debug;

use crate::engine::{Collator, Engine};
use crate::error::CollationError;
use crate::resolver::Strength;

// --- Opaque types ---

#[repr(C)]
pub struct UCollator {
    _opaque: [u8; 0],
}

type UChar = u16;

// --- Constants ---

const U_ZERO_ERROR: c_int = 0;
const U_BUFFER_OVERFLOW_ERROR: c_int = 15;

const UCOL_PRIMARY: c_int = 0;
const UCOL_SECONDARY: c_int = 1;
const UCOL_TERTIARY: c_int = 2;
const UCOL_QUATERNARY: c_int = 3;
const UCOL_IDENTICAL: c_int = 15;

// --- Extern functions ---

extern "C" {
    fn fc_coll_open(locale: *const c_char, status: *mut c_int) -> *mut UCollator;

    fn fc_coll_open_rules(
        rules: *const UChar,
        len: c_int,
        status: *mut c_int,
        error_offset: *mut c_int,
    ) -> *mut UCollator;

    fn fc_coll_get_rules(coll: *const UCollator, dst: *mut UChar, cap: c_int) -> c_int;

    fn fc_coll_set_strength(coll: *mut UCollator, strength: c_int);

    fn fc_coll_strcoll_utf8(
        coll: *const UCollator,
        s: *const c_char,
        slen: c_int,
        t: *const c_char,
        tlen: c_int,
        status: *mut c_int,
    ) -> c_int;

    fn fc_coll_sort_key(
        coll: *const UCollator,
        src: *const UChar,
        len: c_int,
        dst: *mut u8,
        cap: c_int,
    ) -> c_int;

    fn fc_coll_close(coll: *mut UCollator);

    fn fc_str_to_upper(
        dst: *mut UChar,
        cap: c_int,
        src: *const UChar,
        len: c_int,
        locale: *const c_char,
        status: *mut c_int,
    ) -> c_int;

    fn fc_str_to_lower(
        dst: *mut UChar,
        cap: c_int,
        src: *const UChar,
        len: c_int,
        locale: *const c_char,
        status: *mut c_int,
    ) -> c_int;

    fn fc_error_name(status: c_int) -> *const c_char;
}

// --- Status helpers ---

#[inline]
fn is_failure(status: c_int) -> bool {
    status > U_ZERO_ERROR
}

fn engine_error(status: c_int) -> CollationError {
    let name = unsafe { fc_error_name(status) };
    let message = if name.is_null() {
        String::from("unknown ICU error")
    } else {
        let name = unsafe { CStr::from_ptr(name) };
        name.to_string_lossy().into_owned()
    };
    CollationError::Engine {
        code: status,
        message,
    }
}

fn to_c_len(len: usize) -> Result<c_int, CollationError> {
    c_int::try_from(len).map_err(|_| CollationError::Engine {
        code: 1,
        message: String::from("input longer than i32::MAX"),
    })
}

fn icu_locale_id(locale: &LanguageIdentifier) -> Result<CString, CollationError> {
    let id = if *locale == LanguageIdentifier::UNKNOWN {
        String::new()
    } else {
        locale.to_string().replace('-', "_")
    };
    CString::new(id).map_err(|_| CollationError::InvalidLocale {
        tag: locale.to_string(),
        message: String::from("interior NUL"),
    })
}

fn icu_strength(strength: Strength) -> c_int {
    match strength {
        Strength::Primary => UCOL_PRIMARY,
        Strength::Secondary => UCOL_SECONDARY,
        Strength::Tertiary => UCOL_TERTIARY,
        Strength::Quaternary => UCOL_QUATERNARY,
        Strength::Identical => UCOL_IDENTICAL,
    }
}

type CaseMapFn =
    unsafe extern "C" fn(*mut UChar, c_int, *const UChar, c_int, *const c_char, *mut c_int) -> c_int;

fn case_map(map: CaseMapFn, locale: &CStr, s: &str) -> Result<String, CollationError> {
    let src: Vec<UChar> = s.encode_utf16().collect();
    let len = to_c_len(src.len())?;
    // Preflight, then map into an exact-size buffer.
    let mut status = U_ZERO_ERROR;
    let needed =
        unsafe { map(ptr::null_mut(), 0, src.as_ptr(), len, locale.as_ptr(), &mut status) };
    if is_failure(status) && status != U_BUFFER_OVERFLOW_ERROR {
        return Err(engine_error(status));
    }
    let mut dst: Vec<UChar> = vec![0; needed.max(0) as usize];
    status = U_ZERO_ERROR;
    let written = unsafe {
        map(
            dst.as_mut_ptr(),
            needed,
            src.as_ptr(),
            len,
            locale.as_ptr(),
            &mut status,
        )
    };
    if is_failure(status) {
        return Err(engine_error(status));
    }
    dst.truncate(written.max(0) as usize);
    Ok(String::from_utf16_lossy(&dst))
}

// --- Engine ---

/// ICU4C-backed engine. Case mapping uses the root locale.
#[derive(Debug, Clone, Default)]
pub struct IcuEngine {
    case_locale: CString,
}

impl IcuEngine {
    pub fn new() -> Self {
        IcuEngine::default()
    }

    fn rules_of(coll: &IcuCollator) -> Vec<UChar> {
        let len = unsafe { fc_coll_get_rules(coll.raw.as_ptr(), ptr::null_mut(), 0) };
        let mut rules: Vec<UChar> = vec![0; len.max(0) as usize];
        unsafe { fc_coll_get_rules(coll.raw.as_ptr(), rules.as_mut_ptr(), len) };
        rules
    }

    fn open_utf16_rules(rules: &[UChar]) -> Result<IcuCollator, CollationError> {
        let len = to_c_len(rules.len())?;
        let mut status = U_ZERO_ERROR;
        let mut offset: c_int = 0;
        let raw = unsafe { fc_coll_open_rules(rules.as_ptr(), len, &mut status, &mut offset) };
        // A failed open may still hand back a collator; wrap it first so it is closed.
        let coll = NonNull::new(raw).map(|raw| IcuCollator {
            raw,
            strength: Strength::Tertiary,
        });
        if is_failure(status) {
            return Err(CollationError::Rules {
                offset: offset.max(0) as usize,
                message: engine_error(status).to_string(),
            });
        }
        coll.ok_or_else(|| engine_error(status))
    }
}

impl Engine for IcuEngine {
    type Collator = IcuCollator;

    fn name(&self) -> &str {
        "icu4c"
    }

    fn open_locale(
        &self,
        locale: &LanguageIdentifier,
        prefix: &str,
    ) -> Result<IcuCollator, CollationError> {
        let id = icu_locale_id(locale)?;
        let mut status = U_ZERO_ERROR;
        let raw = unsafe { fc_coll_open(id.as_ptr(), &mut status) };
        let coll = NonNull::new(raw).map(|raw| IcuCollator {
            raw,
            strength: Strength::Tertiary,
        });
        if is_failure(status) {
            return Err(engine_error(status));
        }
        let coll = coll.ok_or_else(|| engine_error(status))?;
        if prefix.is_empty() {
            return Ok(coll);
        }
        debug!("icu4c: recomposing {} with {} prefix bytes", locale, prefix.len());
        let mut rules: Vec<UChar> = prefix.encode_utf16().collect();
        rules.extend(IcuEngine::rules_of(&coll));
        drop(coll);
        IcuEngine::open_utf16_rules(&rules)
    }

    fn open_rules(&self, rules: &str) -> Result<IcuCollator, CollationError> {
        let rules: Vec<UChar> = rules.encode_utf16().collect();
        IcuEngine::open_utf16_rules(&rules)
    }

    fn to_upper(&self, s: &str) -> Result<String, CollationError> {
        case_map(fc_str_to_upper, &self.case_locale, s)
    }

    fn to_lower(&self, s: &str) -> Result<String, CollationError> {
        case_map(fc_str_to_lower, &self.case_locale, s)
    }
}

/// ICU collator with close-on-drop.
#[derive(Debug)]
pub struct IcuCollator {
    raw: NonNull<UCollator>,
    strength: Strength,
}

// SAFETY: ICU collators are safe to share for const operations (compare,
// sort keys). `set_strength` takes `&mut self`, so mutation is exclusive.
unsafe impl Send for IcuCollator {}
unsafe impl Sync for IcuCollator {}

impl Collator for IcuCollator {
    fn set_strength(&mut self, strength: Strength) {
        unsafe { fc_coll_set_strength(self.raw.as_ptr(), icu_strength(strength)) };
        self.strength = strength;
    }

    fn strength(&self) -> Strength {
        self.strength
    }

    fn compare_utf8(&self, s: &[u8], t: &[u8]) -> Result<Ordering, CollationError> {
        let mut status = U_ZERO_ERROR;
        let res = unsafe {
            fc_coll_strcoll_utf8(
                self.raw.as_ptr(),
                s.as_ptr() as *const c_char,
                to_c_len(s.len())?,
                t.as_ptr() as *const c_char,
                to_c_len(t.len())?,
                &mut status,
            )
        };
        if is_failure(status) {
            return Err(engine_error(status));
        }
        Ok(res.cmp(&0))
    }

    fn write_sort_key(&self, s: &str, key: &mut Vec<u8>) -> Result<(), CollationError> {
        let src: Vec<UChar> = s.encode_utf16().collect();
        let len = to_c_len(src.len())?;
        let start = key.len();
        let needed =
            unsafe { fc_coll_sort_key(self.raw.as_ptr(), src.as_ptr(), len, ptr::null_mut(), 0) };
        if needed <= 0 {
            return Err(CollationError::Engine {
                code: 1,
                message: String::from("sort key generation failed"),
            });
        }
        key.resize(start + needed as usize, 0);
        unsafe {
            fc_coll_sort_key(
                self.raw.as_ptr(),
                src.as_ptr(),
                len,
                key[start..].as_mut_ptr(),
                needed,
            )
        };
        Ok(())
    }
}

impl Drop for IcuCollator {
    fn drop(&mut self) {
        unsafe { fc_coll_close(self.raw.as_ptr()) }
    }
}
