//! Double-quoted string literal decoding.

use crate::error::UnquoteError;

/// Decodes a double-quoted, backslash-escaped string literal.
///
/// The whole input must be exactly one literal: `"..."` with no text after
/// the closing quote. Supported escapes are `\a \b \f \n \r \t \v \\ \"`,
/// `\xHH`, three-digit octal `\ooo`, `\uHHHH` and `\UHHHHHHHH`.
pub fn unquote(literal: &str) -> Result<String, UnquoteError> {
    let mut chars = literal.chars();

    match chars.next() {
        None => return Err(UnquoteError::Empty),
        Some('"') => {}
        Some(_) => return Err(UnquoteError::NotQuoted(literal.to_string())),
    }

    let mut out = String::with_capacity(literal.len());

    loop {
        let c = chars.next().ok_or(UnquoteError::Unterminated)?;
        match c {
            '"' => break,
            '\n' => return Err(UnquoteError::Unescaped('\n')),
            '\\' => out.push(escape(&mut chars)?),
            other => out.push(other),
        }
    }

    let rest: String = chars.collect();
    if !rest.is_empty() {
        return Err(UnquoteError::Trailing(rest));
    }

    Ok(out)
}

fn escape(chars: &mut std::str::Chars<'_>) -> Result<char, UnquoteError> {
    let c = chars.next().ok_or(UnquoteError::Unterminated)?;

    let simple = match c {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    };
    if let Some(ch) = simple {
        return Ok(ch);
    }

    match c {
        'x' => hex(chars, 'x', 2),
        'u' => hex(chars, 'u', 4),
        'U' => hex(chars, 'U', 8),
        '0'..='7' => {
            let mut digits = String::from(c);
            for _ in 0..2 {
                match chars.next() {
                    Some(d @ '0'..='7') => digits.push(d),
                    Some(d) => return Err(UnquoteError::InvalidEscape(format!("{}{}", digits, d))),
                    None => return Err(UnquoteError::Unterminated),
                }
            }
            let value = u32::from_str_radix(&digits, 8)
                .map_err(|_| UnquoteError::InvalidEscape(digits.clone()))?;
            if value > 0xFF {
                return Err(UnquoteError::InvalidEscape(digits));
            }
            char::from_u32(value).ok_or(UnquoteError::InvalidEscape(digits))
        }
        other => Err(UnquoteError::InvalidEscape(other.to_string())),
    }
}

fn hex(chars: &mut std::str::Chars<'_>, prefix: char, len: usize) -> Result<char, UnquoteError> {
    let mut digits = String::with_capacity(len);
    for _ in 0..len {
        match chars.next() {
            Some(d) if d.is_ascii_hexdigit() => digits.push(d),
            Some(d) => {
                return Err(UnquoteError::InvalidEscape(format!("{}{}{}", prefix, digits, d)))
            }
            None => return Err(UnquoteError::Unterminated),
        }
    }

    let invalid = || UnquoteError::InvalidEscape(format!("{}{}", prefix, digits));
    let value = u32::from_str_radix(&digits, 16).map_err(|_| invalid())?;
    char::from_u32(value).ok_or_else(invalid)
}
