/// Decode an object key as it arrives in trigger events: `+` means space
/// and `%XX` is a percent-escaped byte. Malformed escapes pass through
/// literally rather than failing the event.
pub fn unquote_plus(s: &str) -> String {
    let spaced = s.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_becomes_space() {
        assert_eq!(unquote_plus("my+receipt.jpg"), "my receipt.jpg");
    }

    #[test]
    fn percent_escapes_decode() {
        assert_eq!(unquote_plus("scan%20final.jpg"), "scan final.jpg");
        assert_eq!(unquote_plus("2026%2Ffeb%2Fr1.jpg"), "2026/feb/r1.jpg");
    }

    #[test]
    fn multibyte_escapes_decode_as_utf8() {
        assert_eq!(unquote_plus("price%C2%A3list.jpg"), "price£list.jpg");
    }

    #[test]
    fn malformed_escape_passes_through() {
        assert_eq!(unquote_plus("100%zz"), "100%zz");
        assert_eq!(unquote_plus("oops%"), "oops%");
        assert_eq!(unquote_plus("oops%2"), "oops%2");
    }

    #[test]
    fn plain_key_is_unchanged() {
        assert_eq!(unquote_plus("receipts/scan.jpg"), "receipts/scan.jpg");
    }
}
