// bridge.rs - Byte-level helpers between host buffers and engine strings.
//
// Host strings arrive as UTF-8 byte ranges and leave through fixed-size
// destination buffers. Nothing here writes past `dst.len()`.

use std::borrow::Cow;

use crate::charset::XfrmFlags;

/// Decode host bytes. Ill-formed sequences become U+FFFD.
#[inline]
pub fn decode_utf8(src: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(src)
}

/// Copy as much of `s` as fits into `dst`, stopping at the last whole
/// character. Returns bytes written.
pub fn copy_truncated(s: &str, dst: &mut [u8]) -> usize {
    let mut end = s.len().min(dst.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    dst[..end].copy_from_slice(&s.as_bytes()[..end]);
    end
}

/// Copy a complete sort key into `dst`.
///
/// When the key does not fit, `dst` is left untouched and the full key
/// length is returned so the caller can retry. A key that fits is copied
/// whole; with `PAD_TO_MAXLEN` the tail is zero-filled and `dst.len()` is
/// returned, otherwise the key length.
pub fn copy_sort_key(key: &[u8], dst: &mut [u8], flags: XfrmFlags) -> usize {
    if key.len() > dst.len() {
        return key.len();
    }
    dst[..key.len()].copy_from_slice(key);
    if flags.contains(XfrmFlags::PAD_TO_MAXLEN) {
        dst[key.len()..].fill(0);
        return dst.len();
    }
    key.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossy_decode() {
        assert_eq!(decode_utf8(b"abc"), "abc");
        assert_eq!(decode_utf8(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn truncate_on_char_boundary() {
        let mut dst = [0u8; 4];
        // "aé€": 1 + 2 + 3 bytes
        assert_eq!(copy_truncated("aé€", &mut dst), 3);
        assert_eq!(&dst[..3], "aé".as_bytes());
        assert_eq!(dst[3], 0);

        let mut dst = [0u8; 2];
        assert_eq!(copy_truncated("€", &mut dst), 0);
        assert_eq!(copy_truncated("", &mut dst), 0);
    }

    #[test]
    fn sort_key_too_small_leaves_dst() {
        let mut dst = [0xAAu8; 3];
        assert_eq!(copy_sort_key(&[1, 2, 3, 4], &mut dst, XfrmFlags::empty()), 4);
        assert_eq!(dst, [0xAA; 3]);
    }

    #[test]
    fn sort_key_fits() {
        let mut dst = [0xAAu8; 6];
        assert_eq!(copy_sort_key(&[1, 2, 3], &mut dst, XfrmFlags::empty()), 3);
        assert_eq!(dst, [1, 2, 3, 0xAA, 0xAA, 0xAA]);

        let mut dst = [0xAAu8; 6];
        assert_eq!(copy_sort_key(&[1, 2, 3], &mut dst, XfrmFlags::PAD_TO_MAXLEN), 6);
        assert_eq!(dst, [1, 2, 3, 0, 0, 0]);
    }
}
