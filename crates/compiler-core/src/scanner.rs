use crate::ast::{Position, SourceLocation};

/// Tab, line feed, form feed, carriage return and space.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// The end of a tag name or attribute name section.
pub fn is_end_of_tag_section(c: char) -> bool {
    c == '/' || c == '>' || is_whitespace(c)
}

pub fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(is_whitespace)
}

pub fn has_newline_char(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// Moves `pos` over `source[..len]`. Offsets count bytes, columns count chars.
pub fn advance_position_with_mutation(pos: &mut Position, source: &str, len: usize) {
    let mut len = len.min(source.len());
    while !source.is_char_boundary(len) {
        len -= 1;
    }
    let consumed = &source[..len];
    let mut line_count = 0;
    let mut last_newline = None;
    for (i, c) in consumed.char_indices() {
        if c == '\n' {
            line_count += 1;
            last_newline = Some(i);
        }
    }
    pos.offset += len;
    pos.line += line_count;
    pos.column = match last_newline {
        Some(i) => consumed[i + 1..].chars().count() + 1,
        None => pos.column + consumed.chars().count(),
    };
}

pub fn advance_position_with_clone(pos: &Position, source: &str, len: usize) -> Position {
    let mut pos = *pos;
    advance_position_with_mutation(&mut pos, source, len);
    pos
}

/// Read position over a template. Cheap to copy, so the parser can save and
/// restore it to re-scan a region.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    original: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            original: source,
            pos: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.original[self.pos.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos.offset >= self.original.len()
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Byte index of `pat` in the unconsumed input, searching from `from`.
    pub fn find_from(&self, pat: &str, from: usize) -> Option<usize> {
        let rest = self.rest();
        if from > rest.len() {
            return None;
        }
        rest.get(from..)?.find(pat).map(|i| i + from)
    }

    pub fn advance_by(&mut self, bytes: usize) {
        let bytes = bytes.min(self.rest().len());
        let rest = self.rest();
        advance_position_with_mutation(&mut self.pos, rest, bytes);
    }

    pub fn advance_spaces(&mut self) {
        let len = self
            .rest()
            .find(|c| !is_whitespace(c))
            .unwrap_or(self.rest().len());
        if len > 0 {
            self.advance_by(len);
        }
    }

    /// Position `bytes` ahead of the cursor without moving it.
    pub fn position_ahead(&self, bytes: usize) -> Position {
        advance_position_with_clone(&self.pos, self.rest(), bytes.min(self.rest().len()))
    }

    /// Location from `start` up to the cursor, or up to `end` when given.
    pub fn selection(&self, start: Position, end: Option<Position>) -> SourceLocation {
        let end = end.unwrap_or(self.pos);
        SourceLocation {
            start,
            end,
            source: self.original[start.offset..end.offset].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncdé\nf");
        cursor.advance_by(4);
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().column, 2);
        cursor.advance_by(4);
        assert_eq!(cursor.position().line, 3);
        assert_eq!(cursor.position().column, 1);
        assert_eq!(cursor.rest(), "f");
    }

    #[test]
    fn columns_count_chars() {
        let mut cursor = Cursor::new("éé<");
        cursor.advance_by(4);
        assert_eq!(cursor.position().offset, 4);
        assert_eq!(cursor.position().column, 3);
        assert!(cursor.starts_with("<"));
    }

    #[test]
    fn lookahead() {
        let mut cursor = Cursor::new("  <DIV>");
        cursor.advance_spaces();
        assert_eq!(cursor.peek(), Some('<'));
        assert_eq!(cursor.peek_nth(1), Some('D'));
        assert!(cursor.starts_with("<DIV"));
        assert_eq!(cursor.find_from(">", 1), Some(4));
    }
}
