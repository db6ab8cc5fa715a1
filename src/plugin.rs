// plugin.rs - Host collation vtable over a collation context.
//
// The host's callback table cannot carry errors: init answers with a bool,
// length functions with a byte count, comparisons with an int. Failures are
// recorded in the context's status slot, logged, and answered with the
// neutral value (false, 0 bytes, equal).

use std::cmp::Ordering;

use log::error;

use crate::charset::{CharsetInfo, XfrmFlags};
use crate::context::CollationContext;
use crate::engine::Engine;
use crate::error::CollationError;

/// The host framework's collation callbacks.
pub trait CollationHandler {
    /// Prepare `cs` on the calling thread. `false` on failure.
    fn init(&mut self, cs: &CharsetInfo) -> bool;

    /// Release the calling thread's collators (all of them, not only `cs`).
    fn uninit(&mut self, cs: &CharsetInfo);

    fn caseup(&mut self, cs: &CharsetInfo, src: &[u8], dst: &mut [u8]) -> usize;

    fn casedn(&mut self, cs: &CharsetInfo, src: &[u8], dst: &mut [u8]) -> usize;

    /// Compare `s` with `t`. `t_is_prefix` is accepted for ABI
    /// compatibility; the comparison is the same either way.
    fn strnncoll(&mut self, cs: &CharsetInfo, s: &[u8], t: &[u8], t_is_prefix: bool) -> i32;

    /// Compare ignoring trailing-space semantics. Same comparison as
    /// [`strnncoll`](Self::strnncoll).
    fn strnncollsp(&mut self, cs: &CharsetInfo, s: &[u8], t: &[u8]) -> i32;

    /// Write the sort key of `src` into `dst`. `num_codepoints` is accepted
    /// and ignored. Returns the key length, or the required length when it
    /// does not fit.
    fn strnxfrm(
        &mut self,
        cs: &CharsetInfo,
        dst: &mut [u8],
        num_codepoints: u32,
        src: &[u8],
        flags: XfrmFlags,
    ) -> usize;
}

/// -1, 0 or 1.
#[inline]
pub fn ordering_to_int(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

impl<E: Engine> CollationContext<E> {
    fn settle<T>(
        &mut self,
        op: &str,
        cs: &CharsetInfo,
        res: Result<T, CollationError>,
        neutral: T,
    ) -> T {
        match res {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "{} failed for charset {} ({}): {}",
                    op, cs.number, cs.coll_name, err
                );
                self.record_status(err);
                neutral
            }
        }
    }
}

impl<E: Engine> CollationHandler for CollationContext<E> {
    fn init(&mut self, cs: &CharsetInfo) -> bool {
        let res = CollationContext::init(self, cs).map(|()| true);
        self.settle("init", cs, res, false)
    }

    fn uninit(&mut self, _cs: &CharsetInfo) {
        CollationContext::uninit(self);
    }

    fn caseup(&mut self, cs: &CharsetInfo, src: &[u8], dst: &mut [u8]) -> usize {
        let res = self.case_up(cs, src, dst);
        self.settle("caseup", cs, res, 0)
    }

    fn casedn(&mut self, cs: &CharsetInfo, src: &[u8], dst: &mut [u8]) -> usize {
        let res = self.case_down(cs, src, dst);
        self.settle("casedn", cs, res, 0)
    }

    fn strnncoll(&mut self, cs: &CharsetInfo, s: &[u8], t: &[u8], _t_is_prefix: bool) -> i32 {
        let res = self.compare(cs, s, t).map(ordering_to_int);
        self.settle("strnncoll", cs, res, 0)
    }

    fn strnncollsp(&mut self, cs: &CharsetInfo, s: &[u8], t: &[u8]) -> i32 {
        let res = self.compare(cs, s, t).map(ordering_to_int);
        self.settle("strnncollsp", cs, res, 0)
    }

    fn strnxfrm(
        &mut self,
        cs: &CharsetInfo,
        dst: &mut [u8],
        _num_codepoints: u32,
        src: &[u8],
        flags: XfrmFlags,
    ) -> usize {
        let res = self.sort_key(cs, src, dst, flags);
        self.settle("strnxfrm", cs, res, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::PortableEngine;

    #[test]
    fn ordering_ints() {
        assert_eq!(ordering_to_int(Ordering::Less), -1);
        assert_eq!(ordering_to_int(Ordering::Equal), 0);
        assert_eq!(ordering_to_int(Ordering::Greater), 1);
    }

    #[test]
    fn failure_records_status() {
        let mut ctx: CollationContext<PortableEngine> = CollationContext::default();
        let unknown = CharsetInfo::new(4242, "xx", 3);
        assert!(!CollationHandler::init(&mut ctx, &unknown));
        assert_eq!(ctx.take_status(), Some(CollationError::UnknownCharset(4242)));

        assert_eq!(ctx.strnncoll(&unknown, b"a", b"b", false), 0);
        let mut dst = [0u8; 8];
        assert_eq!(ctx.strnxfrm(&unknown, &mut dst, 0, b"a", XfrmFlags::empty()), 0);
        assert_eq!(dst, [0u8; 8]);
        assert!(ctx.status().is_some());
    }
}
