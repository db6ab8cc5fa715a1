// capi_test.rs - Integration tests for the C ABI entry points.
//
// Every test runs on its own thread, so each sees a fresh thread context.

use std::env;
use std::ffi::CString;
use std::ptr;
use std::thread;

use ferrocoll::capi::*;
use ferrocoll::config::ENV_TAILORING_PREFIX_SIZE;
use ferrocoll::error::{COLL_ERR_INVALID_ARGUMENT, COLL_ERR_UNKNOWN_CHARSET, COLL_NORMAL};

struct Charset {
    raw: RawCharsetInfo,
    _name: CString,
    _comment: CString,
}

fn charset(number: u32, comment: &str, levels: u32) -> Charset {
    let name = CString::new(format!("utf8mb4_icu_{}", number)).unwrap();
    let comment = CString::new(comment).unwrap();
    Charset {
        raw: RawCharsetInfo {
            number,
            coll_name: name.as_ptr(),
            comment: comment.as_ptr(),
            levels_for_compare: levels,
        },
        _name: name,
        _comment: comment,
    }
}

fn compare(cs: &Charset, s: &str, t: &str) -> i32 {
    unsafe {
        ferrocoll_strnncollsp(
            &cs.raw,
            s.as_ptr(),
            s.len(),
            t.as_ptr(),
            t.len(),
        )
    }
}

fn sort_key(cs: &Charset, s: &str, dst: &mut [u8]) -> usize {
    unsafe {
        ferrocoll_strnxfrm(
            &cs.raw,
            dst.as_mut_ptr(),
            dst.len(),
            0,
            s.as_ptr(),
            s.len(),
            0,
        )
    }
}

// === Lifecycle ===

#[test]
fn init_and_uninit() {
    let nb = charset(324, "nb_NO", 3);
    assert!(unsafe { ferrocoll_coll_init(&nb.raw) });
    assert_eq!(ferrocoll_last_status(), COLL_NORMAL);
    unsafe { ferrocoll_coll_uninit(&nb.raw) };
    assert_eq!(ferrocoll_last_status(), COLL_NORMAL);
    // usable again after teardown
    assert_eq!(compare(&nb, "a", "å"), -1);
}

#[test]
fn unknown_charset_fails_init() {
    let cs = charset(12, "", 3);
    assert!(!unsafe { ferrocoll_coll_init(&cs.raw) });
    assert_eq!(ferrocoll_last_status(), COLL_ERR_UNKNOWN_CHARSET);
    // the next successful call clears the status
    let en = charset(325, "en_US", 3);
    assert_eq!(compare(&en, "a", "b"), -1);
    assert_eq!(ferrocoll_last_status(), COLL_NORMAL);
}

#[test]
fn null_arguments_are_rejected() {
    assert!(!unsafe { ferrocoll_coll_init(ptr::null()) });
    assert_eq!(ferrocoll_last_status(), COLL_ERR_INVALID_ARGUMENT);

    let en = charset(325, "en_US", 3);
    let n = unsafe { ferrocoll_strnncoll(&en.raw, ptr::null(), 3, b"a".as_ptr(), 1, false) };
    assert_eq!(n, 0);
    assert_eq!(ferrocoll_last_status(), COLL_ERR_INVALID_ARGUMENT);

    // null with zero length is an empty string
    let n = unsafe { ferrocoll_strnncoll(&en.raw, ptr::null(), 0, b"a".as_ptr(), 1, false) };
    assert_eq!(n, -1);
    assert_eq!(ferrocoll_last_status(), COLL_NORMAL);

    unsafe { ferrocoll_coll_uninit(ptr::null()) };
}

// === String operations ===

#[test]
fn caseup_and_casedn() {
    let en = charset(325, "en_US", 3);
    let src = "straße";
    let mut dst = [0u8; 16];
    let n = unsafe {
        ferrocoll_caseup(
            &en.raw,
            src.as_ptr().cast(),
            src.len(),
            dst.as_mut_ptr().cast(),
            dst.len(),
        )
    };
    assert_eq!(&dst[..n], b"STRASSE");

    let src = "ÅSE";
    let n = unsafe {
        ferrocoll_casedn(
            &en.raw,
            src.as_ptr().cast(),
            src.len(),
            dst.as_mut_ptr().cast(),
            dst.len(),
        )
    };
    assert_eq!(&dst[..n], "åse".as_bytes());
}

#[test]
fn sort_key_capacity_contract() {
    let ja = charset(329, "ja_JP", 4);
    let mut big = [0u8; 256];
    let required = sort_key(&ja, "カタカナ", &mut big);
    assert!(required > 0 && required <= big.len());

    let mut short = vec![0x11u8; required - 1];
    assert_eq!(sort_key(&ja, "カタカナ", &mut short), required);
    assert!(short.iter().all(|&b| b == 0x11));
    assert_eq!(ferrocoll_last_status(), COLL_NORMAL);

    let mut exact = vec![0u8; required];
    assert_eq!(sort_key(&ja, "カタカナ", &mut exact), required);
    assert_eq!(exact[..], big[..required]);
}

#[test]
fn half_width_kana_is_a_tertiary_variant() {
    let tertiary = charset(330, "ja_JP", 3);
    assert_eq!(compare(&tertiary, "ア", "ｱ"), -1);
    let secondary = charset(326, "en_US", 2);
    assert_eq!(compare(&secondary, "abc", "ABC"), 0);
}

// === Threads ===

#[test]
fn threads_have_independent_contexts() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let nb = charset(324, "nb_NO", 1 + i % 3);
                assert!(unsafe { ferrocoll_coll_init(&nb.raw) });
                for _ in 0..100 {
                    assert_eq!(compare(&nb, "z", "ø"), -1);
                }
                unsafe { ferrocoll_coll_uninit(&nb.raw) };
                ferrocoll_last_status()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), COLL_NORMAL);
    }
}

#[test]
fn environment_is_read_once_per_process() {
    fn dog_key() -> Vec<u8> {
        let en = charset(325, "en_US", 3);
        let mut dst = [0u8; 128];
        let n = sort_key(&en, "🐶", &mut dst);
        assert_eq!(ferrocoll_last_status(), COLL_NORMAL);
        dst[..n].to_vec()
    }

    let first = thread::spawn(dog_key).join().unwrap();
    // changing the prefix size after startup must not reach new threads
    env::set_var(ENV_TAILORING_PREFIX_SIZE, "1");
    let second = thread::spawn(dog_key).join().unwrap();
    env::remove_var(ENV_TAILORING_PREFIX_SIZE);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}
