//! Fixed-width C string fields

use std::borrow::Cow;

/// Copy `src` into a fixed char field with C string semantics.
///
/// At most `N - 1` bytes are copied, the terminator is always written and the
/// remainder of the field is zeroed, so a shorter name never leaves a tail of
/// the previous one behind.
pub fn write_c_str<const N: usize>(dst: &mut [u8; N], src: &str) {
    *dst = encode_c_str(src);
}

/// Encode `src` as a NUL-terminated fixed char field.
pub fn encode_c_str<const N: usize>(src: &str) -> [u8; N] {
    let mut out = [0u8; N];
    if N == 0 {
        return out;
    }
    let bytes = src.as_bytes();
    let len = bytes.len().min(N - 1);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

/// Decode a fixed char field up to its first NUL.
pub fn read_c_str(field: &[u8]) -> Cow<'_, str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_terminated_and_padded() {
        let field: [u8; 8] = encode_c_str("abc");
        assert_eq!(&field, b"abc\0\0\0\0\0");
        assert_eq!(read_c_str(&field), "abc");
    }

    #[test]
    fn long_names_are_truncated_before_terminator() {
        let field: [u8; 4] = encode_c_str("abcdef");
        assert_eq!(&field, b"abc\0");
        assert_eq!(read_c_str(&field), "abc");
    }

    #[test]
    fn overwriting_clears_previous_tail() {
        let mut field = [0u8; 8];
        write_c_str(&mut field, "Monza GP");
        write_c_str(&mut field, "Spa");
        assert_eq!(&field, b"Spa\0\0\0\0\0");
    }

    #[test]
    fn unterminated_fields_decode_whole_width() {
        assert_eq!(read_c_str(b"wxyz"), "wxyz");
    }
}
