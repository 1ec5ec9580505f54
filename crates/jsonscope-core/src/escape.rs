//! JSON string escaping for string scalars and object keys.
//!
//! The default rule works on bytes, not code points: printable ASCII passes
//! through, `\b \f \n \r` use their short escapes, `"` and `\` are
//! backslash-escaped, and every other byte (control bytes, DEL and each byte
//! of a multi-byte UTF-8 sequence) becomes `\u00XX` with the byte's value.
//! Non-ASCII text therefore does not survive a round trip through a standard
//! JSON reader under [`Escaping::Ascii`]; [`Escaping::Utf8`] keeps such text
//! as raw UTF-8 instead.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// How bytes outside printable ASCII are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    /// Byte-level `\u00XX` escapes for everything outside printable ASCII.
    #[default]
    Ascii,
    /// Control bytes are escaped; non-ASCII UTF-8 is written unchanged.
    Utf8,
}

/// Appends `s` to `out` as a quoted JSON string.
pub fn write_quoted(out: &mut Vec<u8>, s: &str, escaping: Escaping) {
    out.push(b'"');
    escape_into(out, s, escaping);
    out.push(b'"');
}

/// Appends the escaped form of `s` (without quotes) to `out`.
pub fn escape_into(out: &mut Vec<u8>, s: &str, escaping: Escaping) {
    for &b in s.as_bytes() {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            0x20..=0x7E => out.push(b),
            0x80..=0xFF if escaping == Escaping::Utf8 => out.push(b),
            _ => {
                out.extend_from_slice(b"\\u00");
                out.push(HEX_DIGITS[usize::from(b >> 4)]);
                out.push(HEX_DIGITS[usize::from(b & 0x0F)]);
            }
        }
    }
}

/// Returns `s` as a quoted JSON string using byte-level escaping.
///
/// ```
/// use jsonscope_core::escape::quote;
///
/// assert_eq!(quote("a\\\"b"), r#""a\\\"b""#);
/// assert_eq!(quote("\u{1}"), r#""\u0001""#);
/// ```
pub fn quote(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len() + 2);
    write_quoted(&mut out, s, Escaping::Ascii);
    // Every byte outside printable ASCII was escaped.
    String::from_utf8_lossy(&out).into_owned()
}
