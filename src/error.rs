// error.rs - Error type for collator resolution and string operations.
//
// Groups configuration, rule, locale and engine failures into semantic
// variants while keeping an integer status code for the host ABI.

use std::fmt;

// === Status codes ===
// Negative values, zero is success. Stable across releases: hosts log them.

pub const COLL_NORMAL: i32 = 0;
pub const COLL_ERR_UNKNOWN_CHARSET: i32 = -1;
pub const COLL_ERR_INVALID_LOCALE: i32 = -2;
pub const COLL_ERR_INVALID_PREFIX_SIZE: i32 = -3;
pub const COLL_ERR_INVALID_CONFIG: i32 = -4;
pub const COLL_ERR_INVALID_ARGUMENT: i32 = -5;
pub const COLL_ERR_RULES: i32 = -10;
pub const COLL_ERR_REENTRANT: i32 = -20;
pub const COLL_ERR_UNAVAILABLE: i32 = -21;
/// Engine codes are reported as `COLL_ERR_ENGINE_BASE - engine_code`.
pub const COLL_ERR_ENGINE_BASE: i32 = -100;

/// Error type for collator construction and collation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollationError {
    /// Table-driven resolution got a charset id it has no rules for.
    UnknownCharset(u32),
    /// The charset's locale tag is not a well-formed language identifier.
    InvalidLocale { tag: String, message: String },
    /// Tailoring prefix size outside the composer's recognised range.
    InvalidPrefixSize(u8),
    /// A configuration value could not be interpreted.
    InvalidConfig { key: String, value: String },
    /// The engine rejected the rule text.
    Rules { offset: usize, message: String },
    /// The engine reported an internal failure.
    Engine { code: i32, message: String },
    /// A host argument was unusable, e.g. a null pointer with a non-zero length.
    InvalidArgument(&'static str),
    /// A host entry point was re-entered while the thread context was in use.
    Reentrant,
    /// The thread context is gone (called during thread teardown).
    Unavailable,
}

impl fmt::Display for CollationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollationError::UnknownCharset(id) => write!(f, "no collation rules for charset {}", id),
            CollationError::InvalidLocale { tag, message } => {
                write!(f, "invalid locale {:?}: {}", tag, message)
            }
            CollationError::InvalidPrefixSize(size) => {
                write!(f, "unsupported tailoring prefix size {}", size)
            }
            CollationError::InvalidConfig { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
            CollationError::Rules { offset, message } => {
                write!(f, "malformed rules at offset {}: {}", offset, message)
            }
            CollationError::Engine { code, message } => {
                write!(f, "engine error {}: {}", code, message)
            }
            CollationError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            CollationError::Reentrant => write!(f, "collation context is already in use"),
            CollationError::Unavailable => write!(f, "collation context is unavailable"),
        }
    }
}

impl std::error::Error for CollationError {}

/// Recover an error from a host status code. Codes carry no payload, so ids,
/// tags and sizes come back as placeholders.
impl From<i32> for CollationError {
    fn from(code: i32) -> Self {
        match code {
            COLL_ERR_UNKNOWN_CHARSET => CollationError::UnknownCharset(0),
            COLL_ERR_INVALID_LOCALE => CollationError::InvalidLocale {
                tag: String::new(),
                message: String::from("locale rejected"),
            },
            COLL_ERR_INVALID_PREFIX_SIZE => CollationError::InvalidPrefixSize(u8::MAX),
            COLL_ERR_INVALID_CONFIG => CollationError::InvalidConfig {
                key: String::new(),
                value: String::new(),
            },
            COLL_ERR_INVALID_ARGUMENT => CollationError::InvalidArgument("rejected by host"),
            COLL_ERR_REENTRANT => CollationError::Reentrant,
            COLL_ERR_UNAVAILABLE => CollationError::Unavailable,
            COLL_ERR_RULES => CollationError::Rules {
                offset: 0,
                message: String::from("rules rejected"),
            },
            c if c <= COLL_ERR_ENGINE_BASE => CollationError::Engine {
                code: COLL_ERR_ENGINE_BASE - c,
                message: String::from("engine failure"),
            },
            c => CollationError::Engine {
                code: c,
                message: String::from("unrecognised status"),
            },
        }
    }
}

impl CollationError {
    /// Returns the host status code for this error.
    pub fn code(&self) -> i32 {
        match self {
            CollationError::UnknownCharset(_) => COLL_ERR_UNKNOWN_CHARSET,
            CollationError::InvalidLocale { .. } => COLL_ERR_INVALID_LOCALE,
            CollationError::InvalidPrefixSize(_) => COLL_ERR_INVALID_PREFIX_SIZE,
            CollationError::InvalidConfig { .. } => COLL_ERR_INVALID_CONFIG,
            CollationError::Rules { .. } => COLL_ERR_RULES,
            CollationError::Engine { code, .. } => COLL_ERR_ENGINE_BASE - code,
            CollationError::InvalidArgument(_) => COLL_ERR_INVALID_ARGUMENT,
            CollationError::Reentrant => COLL_ERR_REENTRANT,
            CollationError::Unavailable => COLL_ERR_UNAVAILABLE,
        }
    }

    /// True for errors that come from configuration rather than from a call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CollationError::UnknownCharset(_)
                | CollationError::InvalidLocale { .. }
                | CollationError::InvalidPrefixSize(_)
                | CollationError::InvalidConfig { .. }
        )
    }
}
