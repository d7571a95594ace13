//! Balanced-delimiter extraction over raw source text.
//!
//! Nested object types defeat single-level regexes, so every textual
//! extraction in the crate goes through the depth counting here. String
//! literals are skipped; comments should be masked first with
//! [`mask_comments`].

use std::ops::Range;

#[derive(Clone, Copy)]
enum LexState {
    Code,
    LineComment,
    BlockComment,
    Str(char),
}

/// Replace comment text with spaces. Byte offsets and newlines are kept, so
/// ranges computed on the masked text index the original text too.
pub fn mask_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut state = LexState::Code;

    while let Some(c) = chars.next() {
        match state {
            LexState::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::BlockComment;
                }
                '"' | '\'' | '`' => {
                    out.push(c);
                    state = LexState::Str(c);
                }
                _ => out.push(c),
            },
            LexState::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = LexState::Code;
                } else {
                    push_blank(&mut out, c);
                }
            }
            LexState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = LexState::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    push_blank(&mut out, c);
                }
            }
            LexState::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    state = LexState::Code;
                }
            }
        }
    }

    out
}

fn push_blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

fn closing_for(open: u8) -> Option<u8> {
    match open {
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// `>` of an arrow (`=>`) never closes an angle bracket.
fn is_arrow_head(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'>' && i > 0 && bytes[i - 1] == b'='
}

/// Index of the delimiter closing the one at `open_index`.
///
/// Returns `None` if `open_index` is not an opening delimiter or the text
/// ends before the depth returns to zero.
pub fn matching_close(text: &str, open_index: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_index)?;
    let close = closing_for(open)?;

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open_index;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else if b == b'"' || b == b'\'' || b == b'`' {
            quote = Some(b);
        } else if b == open {
            depth += 1;
        } else if b == close && !is_arrow_head(bytes, i) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }

    None
}

/// Text strictly between the delimiter at `open_index` and its match.
pub fn enclosed(text: &str, open_index: usize) -> Option<&str> {
    let close = matching_close(text, open_index)?;
    text.get(open_index + 1..close)
}

/// Split `text` at `separators` that sit at nesting depth zero.
///
/// All bracket kinds count towards depth. Returned ranges cover the pieces
/// between separators, separators excluded; empty pieces are kept.
pub fn split_top_level(text: &str, separators: &[u8]) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'{' | b'(' | b'[' | b'<' => depth += 1,
                b'}' | b')' | b']' => depth = depth.saturating_sub(1),
                b'>' if !is_arrow_head(bytes, i) => depth = depth.saturating_sub(1),
                _ if depth == 0 && separators.contains(&b) => {
                    pieces.push(start..i);
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }

    pieces.push(start..bytes.len().max(start));
    pieces
}
