//! Percent encoding with the same unreserved set as a browser's
//! `encodeURIComponent`, used for the `from` redirect parameter and the
//! `user` cookie.

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Reverse of [`encode_component`]. `None` on a truncated or non-hex escape,
/// or when the decoded bytes are not UTF-8.
pub fn decode_component(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_browser_behaviour() {
        assert_eq!(encode_component("/person-view?x=1&y=2"), "%2Fperson-view%3Fx%3D1%26y%3D2");
        assert_eq!(encode_component("Ravi Kumar"), "Ravi%20Kumar");
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)"), "a-b_c.d!e~f*g'h(i)");
        assert_eq!(encode_component("Zoë"), "Zo%C3%AB");
    }

    #[test]
    fn test_decode_reverses_encode() {
        let raw = "Zoë / ops;team";
        assert_eq!(decode_component(&encode_component(raw)).as_deref(), Some(raw));
    }

    #[test]
    fn test_decode_rejects_bad_escapes() {
        assert_eq!(decode_component("%E0%A4%A"), None);
        assert_eq!(decode_component("%zz"), None);
        assert_eq!(decode_component("%FF"), None);
        assert_eq!(decode_component("%+41"), None);
        assert_eq!(decode_component("%-1"), None);
    }
}
