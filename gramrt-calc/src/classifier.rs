//! Layer 1: classified characters.
//!
//! [`Classifier`] reads lines from a [`LineSource`] and delivers one
//! [`CharClass`] per character, plus [`CharClass::EndOfLine`] at the end of each
//! line. Digits, letters and unclassified characters carry their `Char`.

use crate::source::LineSource;
use crate::CalcError;
use gramrt::{Cursor, Position, ProviderCtx, Stacks, SymbolProvider, Value};
use smartstring::alias::String;
use std::fmt;

/// Character classes, in the order the lexer's range tests depend on.
///
/// The first thirteen are passed on by the lexer unchanged and must keep the
/// same relative order as their counterparts in
/// [`LexSymbol`](crate::LexSymbol).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    AddOp,
    SubOp,
    MultOp,
    DivOp,
    PowOp,
    OtherCharacter,
    RightParen,
    EndOfLine,
    EqualChar,
    LTChar,
    GTChar,
    LeftParen,
    DecimalPoint,
    Digit,
    Letter,
}

impl CharClass {
    pub fn of(c: char) -> CharClass {
        match c {
            '0'..='9' => CharClass::Digit,
            c if c.is_alphabetic() => CharClass::Letter,
            '+' => CharClass::AddOp,
            '-' => CharClass::SubOp,
            '*' => CharClass::MultOp,
            '/' => CharClass::DivOp,
            '^' => CharClass::PowOp,
            '(' => CharClass::LeftParen,
            ')' => CharClass::RightParen,
            '=' => CharClass::EqualChar,
            '<' => CharClass::LTChar,
            '>' => CharClass::GTChar,
            '\n' => CharClass::EndOfLine,
            '.' | ',' => CharClass::DecimalPoint,
            _ => CharClass::OtherCharacter,
        }
    }

    /// Whether the class carries the character as attribute.
    pub fn has_char(self) -> bool {
        matches!(
            self,
            CharClass::Digit | CharClass::Letter | CharClass::OtherCharacter
        )
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Character source of a parse session.
///
/// A new line is read only once the previous line's `EndOfLine` has been
/// consumed.
pub struct Classifier<L> {
    ctx: ProviderCtx<CharClass, Value>,
    source: L,
    line: Vec<char>,
    /// Index of the pending character; `line.len()` is the end of line and
    /// anything beyond means a new line is due.
    column: usize,
    pending: char,
    cursor: Cursor,
    lines_read: usize,
    at_end: bool,
    /// Characters consumed since the last `take_lexeme`.
    lexeme: String,
}

impl<L: LineSource> Classifier<L> {
    pub fn new(source: L) -> Self {
        Self::with_ctx(source, ProviderCtx::new())
    }

    pub fn with_ctx(source: L, ctx: ProviderCtx<CharClass, Value>) -> Self {
        Self {
            ctx,
            source,
            line: Vec::new(),
            column: 1,
            pending: '\n',
            cursor: Cursor::new(),
            lines_read: 0,
            at_end: false,
            lexeme: String::new(),
        }
    }

    fn load_line(&mut self) -> Result<(), CalcError> {
        self.line.clear();
        self.column = 0;
        match self.source.next_line()? {
            Some(line) => {
                self.line.extend(line.chars());
                if self.lines_read > 0 {
                    self.cursor.next_line();
                }
                self.lines_read += 1;
                log::trace!("line {}: {:?}", self.lines_read, line);
            }
            None => {
                if !self.at_end {
                    log::debug!("end of input after {} lines", self.lines_read);
                }
                self.at_end = true;
            }
        }
        Ok(())
    }

    /// Reads the next line if the previous one is used up. `false` at end of
    /// input.
    pub fn has_input(&mut self) -> Result<bool, CalcError> {
        if self.is_accepted() && self.column > self.line.len() {
            self.load_line()?;
        }
        Ok(!self.at_end)
    }

    /// Position of the pending (or next) character.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// The characters consumed since the previous call, line ends excluded.
    pub fn take_lexeme(&mut self) -> String {
        std::mem::take(&mut self.lexeme)
    }

    /// Skips the rest of the current line, returning the skipped text without
    /// the line end. A pending character is included.
    pub fn remaining_of_line(&mut self) -> String {
        let mut skipped = String::new();
        if !self.is_accepted() {
            if self.column < self.line.len() {
                skipped.push(self.pending);
            }
            self.discard();
        }
        if self.column < self.line.len() {
            skipped.extend(self.line[self.column..].iter().copied());
        }
        self.column = self.line.len() + 1;
        skipped
    }
}

impl<L: LineSource> SymbolProvider for Classifier<L> {
    type Symbol = CharClass;
    type Value = Value;
    type Error = CalcError;

    fn ctx(&self) -> &ProviderCtx<CharClass, Value> {
        &self.ctx
    }

    fn ctx_mut(&mut self) -> &mut ProviderCtx<CharClass, Value> {
        &mut self.ctx
    }

    fn fetch(&mut self, _stacks: &mut Stacks<Value>) -> Result<CharClass, CalcError> {
        if self.column > self.line.len() {
            self.load_line()?;
        }
        self.pending = self.line.get(self.column).copied().unwrap_or('\n');
        let class = CharClass::of(self.pending);
        if class.has_char() {
            self.ctx.stage(Value::Char(self.pending));
        }
        Ok(class)
    }

    fn on_accept(&mut self) {
        if self.column < self.line.len() {
            self.lexeme.push(self.pending);
        }
        self.column += 1;
        self.cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrLines;

    fn classes(text: &str) -> Vec<CharClass> {
        let mut stacks = Stacks::new();
        let mut c = Classifier::new(StrLines::new(text));
        let mut out = Vec::new();
        while c.has_input().unwrap() {
            loop {
                let class = c.peek(&mut stacks).unwrap();
                c.accept(&mut stacks);
                out.push(class);
                if class == CharClass::EndOfLine {
                    break;
                }
            }
        }
        out
    }

    #[test]
    fn classifies_a_formula() {
        use CharClass::*;
        assert_eq!(
            classes("a=1,5*(2)#"),
            vec![
                Letter, EqualChar, Digit, DecimalPoint, Digit, MultOp, LeftParen, Digit,
                RightParen, OtherCharacter, EndOfLine
            ]
        );
    }

    #[test]
    fn every_line_ends_with_end_of_line() {
        use CharClass::*;
        assert_eq!(
            classes("<\n\n>"),
            vec![LTChar, EndOfLine, EndOfLine, GTChar, EndOfLine]
        );
    }

    #[test]
    fn attributes_only_for_char_classes() {
        let mut stacks = Stacks::new();
        let mut c = Classifier::new(StrLines::new("7+x"));
        for _ in 0..3 {
            c.peek(&mut stacks).unwrap();
            c.accept(&mut stacks);
        }
        assert_eq!(stacks.attrs.count(), 2);
        assert_eq!(stacks.attrs.char(-1).unwrap(), '7');
        assert_eq!(stacks.attrs.char(0).unwrap(), 'x');
    }

    #[test]
    fn position_follows_accepted_characters() {
        let mut stacks = Stacks::new();
        let mut c = Classifier::new(StrLines::new("ab\ncd"));
        assert!(c.has_input().unwrap());
        c.peek(&mut stacks).unwrap();
        c.accept(&mut stacks);
        assert_eq!(c.position(), Position::new(0, 1));
        c.remaining_of_line();
        assert!(c.has_input().unwrap());
        assert_eq!(c.position(), Position::new(1, 0));
    }

    #[test]
    fn remaining_of_line_includes_pending_character() {
        let mut stacks = Stacks::new();
        let mut c = Classifier::new(StrLines::new("1 + 2\nnext"));
        c.peek(&mut stacks).unwrap();
        c.accept(&mut stacks);
        assert_eq!(c.peek(&mut stacks).unwrap(), CharClass::OtherCharacter);
        assert_eq!(c.remaining_of_line().as_str(), " + 2");
        assert!(c.is_accepted());
        assert!(c.has_input().unwrap());
        assert_eq!(c.peek(&mut stacks).unwrap(), CharClass::Letter);
    }

    #[test]
    fn end_of_input() {
        let mut stacks = Stacks::new();
        let mut c = Classifier::new(StrLines::new("x"));
        assert!(c.has_input().unwrap());
        c.remaining_of_line();
        assert!(!c.has_input().unwrap());
        assert_eq!(c.peek(&mut stacks).unwrap(), CharClass::EndOfLine);
    }

    #[test]
    fn range_order() {
        assert!(CharClass::SubOp < CharClass::OtherCharacter);
        assert!(CharClass::PowOp < CharClass::OtherCharacter);
        assert!(CharClass::DecimalPoint < CharClass::Digit);
        assert!(CharClass::Digit < CharClass::Letter);
    }
}
