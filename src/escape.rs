//! Backslash escapes in format strings.
//!
//! | Escape | Result |
//! |--------|--------|
//! | `\\`   | `\`    |
//! | `\0`   | NUL    |
//! | `\n`   | newline|
//! | `\t`   | tab    |
//!
//! Any other escaped character stands for itself (`\s` becomes `s`) and a
//! trailing lone backslash is dropped.

fn escaped_char(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        '0' => Some('\0'),
        'n' => Some('\n'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Decode backslash escapes. Decoding never fails.
pub fn decode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_escape = false;
    for c in raw.chars() {
        if in_escape {
            out.push(escaped_char(c).unwrap_or(c));
            in_escape = false;
        } else if c == '\\' {
            in_escape = true;
        } else {
            out.push(c);
        }
    }
    out
}
