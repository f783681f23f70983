//! Raw input: one line at a time, blocking.

use smartstring::alias::String;
use std::io::{self, BufRead};

/// Supplies lines of text to the classifier.
pub trait LineSource {
    /// The next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Lines of an in-memory text.
#[derive(Debug, Clone)]
pub struct StrLines {
    lines: std::vec::IntoIter<String>,
}

impl StrLines {
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(String::from).collect();
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl LineSource for StrLines {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.next())
    }
}

/// Lines read from any buffered reader (a file, stdin).
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = std::string::String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        Ok(Some(String::from(line)))
    }
}
