//! TXT and DNS name escaping as Route 53 reads and writes it
//!
//! TXT data is one or more quoted character-strings of at most 255 bytes each.
//! Inside a string, `"` and `\` are backslash-escaped and bytes outside the
//! printable ASCII range are written as three-digit octal escapes (`\303\251`
//! for `é`). Record names use the same octal escapes (`\052` for `*`).

/// Longest single character-string a TXT record may carry.
pub const MAX_CHARACTER_STRING: usize = 255;

/// Quote raw content for a TXT record.
///
/// Content longer than 255 bytes is split into several space-separated
/// strings. The split is on bytes; a character cut in two reads back whole
/// because [`unquote_txt`] concatenates the strings before decoding UTF-8.
pub fn quote_txt(content: &str) -> String {
    if content.is_empty() {
        return "\"\"".to_string();
    }

    content
        .as_bytes()
        .chunks(MAX_CHARACTER_STRING)
        .map(quote_chunk)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_chunk(chunk: &[u8]) -> String {
    let mut out = String::with_capacity(chunk.len() + 2);
    out.push('"');
    for &b in chunk {
        match b {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(char::from(b));
            }
            b' '..=b'~' => out.push(char::from(b)),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push('"');
    out
}

/// Decode a TXT value as served back into raw content.
///
/// Multiple character-strings are concatenated. `\"`, `\\` and octal `\ooo`
/// escapes are decoded. Input without quotes is trimmed and only unescaped.
pub fn unquote_txt(value: &str) -> String {
    let trimmed = value.trim();
    decode(trimmed, trimmed.starts_with('"'))
}

/// Decode the octal escapes in a record name (`\052.example.com.` -> `*.example.com.`).
pub fn unescape_name(name: &str) -> String {
    decode(name, false)
}

fn decode(input: &str, quoted: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    // Unquoted input is one implicit string.
    let mut in_string = !quoted;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' if quoted => {
                in_string = !in_string;
                i += 1;
            }
            _ if !in_string => i += 1,
            b'\\' => {
                if let Some(byte) = octal_escape(&bytes[i + 1..]) {
                    out.push(byte);
                    i += 4;
                } else if let Some(&next) = bytes.get(i + 1) {
                    out.push(next);
                    i += 2;
                } else {
                    out.push(b'\\');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Three octal digits at the start of `rest`, as a byte.
fn octal_escape(rest: &[u8]) -> Option<u8> {
    let digits = rest.get(..3)?;
    if !digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0_u16, |acc, d| acc * 8 + u16::from(d - b'0'));
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_simple_value() {
        assert_eq!(quote_txt("abc123"), "\"abc123\"");
        assert_eq!(quote_txt(""), "\"\"");
        assert_eq!(quote_txt("v=spf1 -all"), "\"v=spf1 -all\"");
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(quote_txt(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn non_printable_bytes_written_as_octal() {
        assert_eq!(quote_txt("café\tx"), r#""caf\303\251\011x""#);
        assert_eq!(quote_txt("\u{7f}"), r#""\177""#);
    }

    #[test]
    fn long_values_split_into_strings() {
        let content = "x".repeat(300);
        let quoted = quote_txt(&content);
        assert_eq!(
            quoted,
            format!("\"{}\" \"{}\"", "x".repeat(255), "x".repeat(45))
        );
        assert_eq!(unquote_txt(&quoted), content);
    }

    #[test]
    fn split_inside_a_character_reads_back_whole() {
        let content = format!("{}é", "a".repeat(254));
        let quoted = quote_txt(&content);
        assert_eq!(quoted, format!("\"{}\\303\" \"\\251\"", "a".repeat(254)));
        assert_eq!(unquote_txt(&quoted), content);
    }

    #[test]
    fn unquote_decodes_octal_escapes() {
        assert_eq!(unquote_txt(r#""\052""#), "*");
        assert_eq!(unquote_txt(r#""caf\303\251""#), "café");
        assert_eq!(unquote_txt(r#""v=spf1\040-all""#), "v=spf1 -all");
    }

    #[test]
    fn unquote_handles_escapes() {
        assert_eq!(unquote_txt(r#""abc123""#), "abc123");
        assert_eq!(unquote_txt(r#""a\"b\\c""#), "a\"b\\c");
        assert_eq!(unquote_txt(r#""part one" "part two""#), "part onepart two");
        // 9 is not an octal digit
        assert_eq!(unquote_txt(r#""\901""#), "901");
    }

    #[test]
    fn unquote_passes_plain_values_through() {
        assert_eq!(unquote_txt("abc123"), "abc123");
        assert_eq!(unquote_txt("  spaced  "), "spaced");
    }

    #[test]
    fn escaped_content_survives_reading_back() {
        let raw = r#"token "with" \ slashes"#;
        assert_eq!(unquote_txt(&quote_txt(raw)), raw);

        let unicode = "héllo wörld ✓\nnext";
        assert_eq!(unquote_txt(&quote_txt(unicode)), unicode);
    }

    #[test]
    fn names_unescaped() {
        assert_eq!(unescape_name(r"\052.example.com."), "*.example.com.");
        assert_eq!(unescape_name("app.example.com."), "app.example.com.");
    }
}
