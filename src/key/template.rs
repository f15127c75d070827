//! Key template parsing
//!
//! A template is literal text interleaved with checksum placeholders of the
//! form `#{path}`. An unterminated `#{` or an empty `#{}` is literal text.

/// Opening marker of a checksum placeholder
pub const OPEN: &str = "#{";

/// Closing marker of a checksum placeholder
pub const CLOSE: char = '}';

/// One piece of a parsed key template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    /// Text copied verbatim into the resolved key
    Literal(&'a str),
    /// Raw placeholder body (untrimmed) naming a file to checksum
    Checksum(&'a str),
}

/// Split a template into literal and placeholder spans, in order
pub fn parse(template: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = template[cursor..].find(OPEN) {
        let open = cursor + offset;
        let body_start = open + OPEN.len();

        let Some(body_len) = template[body_start..].find(CLOSE) else {
            break;
        };

        if body_len == 0 {
            cursor = body_start;
            continue;
        }

        if literal_start < open {
            spans.push(Span::Literal(&template[literal_start..open]));
        }
        spans.push(Span::Checksum(&template[body_start..body_start + body_len]));

        cursor = body_start + body_len + CLOSE.len_utf8();
        literal_start = cursor;
    }

    if literal_start < template.len() {
        spans.push(Span::Literal(&template[literal_start..]));
    }

    spans
}
