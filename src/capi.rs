// capi.rs - C ABI entry points for the host's collation handler table.
//
// Each worker thread gets its own `CollationContext`, created on first call
// and dropped with the thread. The configuration is read from the
// environment once per process, so every thread builds identical keys. Entry
// points never unwind into the host: failures are logged and leave their
// code in a per-thread status readable through `ferrocoll_last_status`.

use std::cell::{Cell, RefCell};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint};
use std::slice;
use std::sync::OnceLock;

use log::{debug, error};

use crate::charset::{CharsetInfo, XfrmFlags};
use crate::config::CollationConfig;
use crate::context::CollationContext;
use crate::engines::DefaultEngine;
use crate::error::{CollationError, COLL_NORMAL};
use crate::plugin::CollationHandler;

/// The host's charset record, as laid out in C.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawCharsetInfo {
    pub number: c_uint,
    /// NUL-terminated, may be null.
    pub coll_name: *const c_char,
    /// NUL-terminated locale tag or comment, may be null.
    pub comment: *const c_char,
    pub levels_for_compare: c_uint,
}

impl RawCharsetInfo {
    /// Copy the record into an owned [`CharsetInfo`]. Null strings become empty.
    ///
    /// # Safety
    ///
    /// Non-null `coll_name` and `comment` must point to valid NUL-terminated
    /// strings.
    pub unsafe fn to_charset_info(&self) -> CharsetInfo {
        CharsetInfo {
            number: self.number,
            coll_name: unsafe { owned_c_str(self.coll_name) },
            comment: unsafe { owned_c_str(self.comment) },
            levels_for_compare: self.levels_for_compare,
        }
    }
}

unsafe fn owned_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let s = unsafe { CStr::from_ptr(ptr) };
    s.to_string_lossy().into_owned()
}

// === Process and thread state ===

static PROCESS_CONFIG: OnceLock<Result<CollationConfig, CollationError>> = OnceLock::new();

/// Configuration shared by every thread context, read on first use.
fn process_config() -> Result<CollationConfig, CollationError> {
    PROCESS_CONFIG
        .get_or_init(|| {
            let config = CollationConfig::from_env();
            match &config {
                Ok(config) => debug!(
                    "collation config: {:?} strategy, prefix {}",
                    config.strategy, config.tailoring_prefix_size
                ),
                Err(err) => error!("collation config: {}", err),
            }
            config
        })
        .clone()
}

thread_local! {
    static CONTEXT: RefCell<Option<CollationContext<DefaultEngine>>> = const { RefCell::new(None) };
    static LAST_STATUS: Cell<c_int> = const { Cell::new(COLL_NORMAL) };
}

fn set_status(code: c_int) {
    // Ignored during thread teardown.
    let _ = LAST_STATUS.try_with(|status| status.set(code));
}

fn with_context<T>(
    f: impl FnOnce(&mut CollationContext<DefaultEngine>) -> T,
) -> Result<T, CollationError> {
    CONTEXT
        .try_with(|cell| -> Result<T, CollationError> {
            let mut slot = cell.try_borrow_mut().map_err(|_| CollationError::Reentrant)?;
            let ctx = match &mut *slot {
                Some(ctx) => ctx,
                empty => {
                    let config = process_config()?;
                    debug!("creating thread collation context");
                    empty.insert(CollationContext::new(DefaultEngine::default(), config))
                }
            };
            Ok(f(ctx))
        })
        .unwrap_or(Err(CollationError::Unavailable))
}

/// Run `f` on the thread context and publish its outcome as the thread status.
fn dispatch<T>(
    op: &str,
    neutral: T,
    f: impl FnOnce(&mut CollationContext<DefaultEngine>) -> T,
) -> T {
    let res = with_context(|ctx| {
        let value = f(ctx);
        (value, ctx.take_status())
    });
    match res {
        Ok((value, None)) => {
            set_status(COLL_NORMAL);
            value
        }
        Ok((value, Some(err))) => {
            set_status(err.code());
            value
        }
        Err(err) => {
            error!("{}: {}", op, err);
            set_status(err.code());
            neutral
        }
    }
}

fn reject<T>(op: &str, what: &'static str, neutral: T) -> T {
    let err = CollationError::InvalidArgument(what);
    error!("{}: {}", op, err);
    set_status(err.code());
    neutral
}

unsafe fn charset(cs: *const RawCharsetInfo) -> Option<CharsetInfo> {
    let raw = unsafe { cs.as_ref() }?;
    Some(unsafe { raw.to_charset_info() })
}

unsafe fn input<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(unsafe { slice::from_raw_parts(ptr, len) })
    }
}

unsafe fn output<'a>(ptr: *mut u8, len: usize) -> Option<&'a mut [u8]> {
    if len == 0 {
        Some(&mut [])
    } else if ptr.is_null() {
        None
    } else {
        Some(unsafe { slice::from_raw_parts_mut(ptr, len) })
    }
}

// === Entry points ===

/// Build the collator for `cs` on the calling thread.
///
/// # Safety
///
/// `cs` must be null or point to a valid [`RawCharsetInfo`].
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_coll_init(cs: *const RawCharsetInfo) -> bool {
    let Some(cs) = (unsafe { charset(cs) }) else {
        return reject("init", "null charset", false);
    };
    dispatch("init", false, |ctx| CollationHandler::init(ctx, &cs))
}

/// Release every collator held by the calling thread.
///
/// # Safety
///
/// `cs` must be null or point to a valid [`RawCharsetInfo`].
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_coll_uninit(cs: *const RawCharsetInfo) {
    let cs = unsafe { charset(cs) }.unwrap_or_else(|| CharsetInfo::new(0, "", 0));
    dispatch("uninit", (), |ctx| CollationHandler::uninit(ctx, &cs))
}

/// Uppercase `src` into `dst`. Returns bytes written.
///
/// # Safety
///
/// `cs` as for [`ferrocoll_coll_init`]. `src` must be readable for `srclen`
/// bytes and `dst` writable for `dstlen` bytes; either may be null when its
/// length is zero.
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_caseup(
    cs: *const RawCharsetInfo,
    src: *const c_char,
    srclen: usize,
    dst: *mut c_char,
    dstlen: usize,
) -> usize {
    let (Some(cs), Some(src), Some(dst)) = (unsafe {
        (
            charset(cs),
            input(src as *const u8, srclen),
            output(dst as *mut u8, dstlen),
        )
    }) else {
        return reject("caseup", "null pointer", 0);
    };
    dispatch("caseup", 0, |ctx| ctx.caseup(&cs, src, dst))
}

/// Lowercase `src` into `dst`. Returns bytes written.
///
/// # Safety
///
/// Same as [`ferrocoll_caseup`].
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_casedn(
    cs: *const RawCharsetInfo,
    src: *const c_char,
    srclen: usize,
    dst: *mut c_char,
    dstlen: usize,
) -> usize {
    let (Some(cs), Some(src), Some(dst)) = (unsafe {
        (
            charset(cs),
            input(src as *const u8, srclen),
            output(dst as *mut u8, dstlen),
        )
    }) else {
        return reject("casedn", "null pointer", 0);
    };
    dispatch("casedn", 0, |ctx| ctx.casedn(&cs, src, dst))
}

/// Compare `s` with `t`: -1, 0 or 1.
///
/// # Safety
///
/// `cs` as for [`ferrocoll_coll_init`]. `s` and `t` must be readable for
/// `slen` and `tlen` bytes; either may be null when its length is zero.
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_strnncoll(
    cs: *const RawCharsetInfo,
    s: *const u8,
    slen: usize,
    t: *const u8,
    tlen: usize,
    t_is_prefix: bool,
) -> c_int {
    let (Some(cs), Some(s), Some(t)) = (unsafe { (charset(cs), input(s, slen), input(t, tlen)) })
    else {
        return reject("strnncoll", "null pointer", 0);
    };
    dispatch("strnncoll", 0, |ctx| ctx.strnncoll(&cs, s, t, t_is_prefix))
}

/// Compare `s` with `t`, trailing-space variant: -1, 0 or 1.
///
/// # Safety
///
/// Same as [`ferrocoll_strnncoll`].
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_strnncollsp(
    cs: *const RawCharsetInfo,
    s: *const u8,
    slen: usize,
    t: *const u8,
    tlen: usize,
) -> c_int {
    let (Some(cs), Some(s), Some(t)) = (unsafe { (charset(cs), input(s, slen), input(t, tlen)) })
    else {
        return reject("strnncollsp", "null pointer", 0);
    };
    dispatch("strnncollsp", 0, |ctx| ctx.strnncollsp(&cs, s, t))
}

/// Write the sort key of `src` into `dst`.
///
/// Returns the key length, or `dstlen` with `PAD_TO_MAXLEN`. When the key
/// does not fit, nothing is written and the required length is returned.
///
/// # Safety
///
/// `cs` as for [`ferrocoll_coll_init`]. `src` must be readable for `srclen`
/// bytes and `dst` writable for `dstlen` bytes; either may be null when its
/// length is zero.
#[no_mangle]
pub unsafe extern "C" fn ferrocoll_strnxfrm(
    cs: *const RawCharsetInfo,
    dst: *mut u8,
    dstlen: usize,
    num_codepoints: c_uint,
    src: *const u8,
    srclen: usize,
    flags: c_uint,
) -> usize {
    let (Some(cs), Some(dst), Some(src)) =
        (unsafe { (charset(cs), output(dst, dstlen), input(src, srclen)) })
    else {
        return reject("strnxfrm", "null pointer", 0);
    };
    let flags = XfrmFlags::from_bits_truncate(flags);
    dispatch("strnxfrm", 0, |ctx| {
        ctx.strnxfrm(&cs, dst, num_codepoints, src, flags)
    })
}

/// Status code of the calling thread's last entry-point call, 0 on success.
#[no_mangle]
pub extern "C" fn ferrocoll_last_status() -> c_int {
    LAST_STATUS.try_with(Cell::get).unwrap_or(COLL_NORMAL)
}
