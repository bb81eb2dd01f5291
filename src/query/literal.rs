use std::str::Chars;

/// Wraps `s` in double quotes, escaping quotes, backslashes and control
/// characters so that [`unquote`] gives back the same string.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0b' => out.push_str("\\v"),
            '\x0c' => out.push_str("\\f"),
            c if c.is_control() && (c as u32) <= 0xFFFF => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\U{:08x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decodes a double-quoted literal, quotes included.
///
/// The error is a short reason suitable for a parse error message.
pub fn unquote(literal: &str) -> Result<String, String> {
    let body = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or("missing surrounding quotes")?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(unescape(&mut chars)?),
            '"' => return Err("unescaped quote inside string".to_string()),
            '\n' => return Err("newline inside string".to_string()),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn unescape(chars: &mut Chars<'_>) -> Result<char, String> {
    let c = chars.next().ok_or("unterminated escape sequence")?;
    let decoded = match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        '\\' => '\\',
        '"' => '"',
        'x' => ascii(digits(chars, 16, 2)?)?,
        'u' => scalar(digits(chars, 16, 4)?)?,
        'U' => scalar(digits(chars, 16, 8)?)?,
        '0'..='7' => {
            let rest = digits(chars, 8, 2)?;
            ascii((c as u32 - '0' as u32) * 64 + rest)?
        }
        other => return Err(format!("invalid escape sequence \\{}", other)),
    };
    Ok(decoded)
}

fn digits(chars: &mut Chars<'_>, radix: u32, count: usize) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or("malformed escape sequence")?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn ascii(code: u32) -> Result<char, String> {
    if code > 0x7F {
        return Err(format!("byte escape {:#x} is not ASCII", code));
    }
    scalar(code)
}

fn scalar(code: u32) -> Result<char, String> {
    char::from_u32(code).ok_or_else(|| format!("invalid Unicode code point {:#x}", code))
}
