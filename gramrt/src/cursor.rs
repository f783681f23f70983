/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 0-based line number.
    pub line: usize,
    /// 0-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open source range: `[start, end)`.
///
/// It is conventional for `start <= end` in lexicographic `(line, column)`
/// ordering; this is not enforced.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty span at `at`.
    #[inline]
    pub const fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Human-readable form for diagnostics.
    pub fn display(&self) -> String {
        format!(
            "span {}:{} to {}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Position of the next character of a line-oriented input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Steps over one character of the current line.
    #[inline]
    pub fn advance(&mut self) {
        self.pos.column += 1;
    }

    /// Moves to column 0 of the following line.
    pub fn next_line(&mut self) {
        self.pos.line += 1;
        self.pos.column = 0;
    }
}

/// Build a `Span` inline from 0-based line/column coordinates.
///
/// The macro returns `Option<Span>`, which is what diagnostics carry.
///
/// # Examples
///
/// ```rust
/// # use gramrt::span;
/// let s = span!(0, 0, 1, 4);
/// assert_eq!(s.unwrap().end.column, 4);
/// ```
#[macro_export]
macro_rules! span {
    ($line_start:expr, $col_start:expr, $line_end:expr, $col_end:expr) => {
        Some($crate::Span {
            start: $crate::Position {
                line: $line_start,
                column: $col_start,
            },
            end: $crate::Position {
                line: $line_end,
                column: $col_end,
            },
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(Position::new(0, 2), Position::new(0, 4));
        let b = Span::new(Position::new(0, 3), Position::new(1, 0));
        let m = a.merge(&b);
        assert_eq!(m, span!(0, 2, 1, 0).unwrap());
        assert_eq!(m.display(), "span 0:2 to 1:0");
    }

    #[test]
    fn point_is_empty() {
        assert!(Span::point(Position::new(3, 1)).is_empty());
    }

    #[test]
    fn cursor_walks_lines() {
        let mut c = Cursor::new();
        c.advance();
        c.advance();
        assert_eq!(c.position(), Position::new(0, 2));
        c.next_line();
        assert_eq!(c.position(), Position::new(1, 0));
    }
}
