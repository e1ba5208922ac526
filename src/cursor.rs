// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small character cursor shared by the PDL and flag-expression parsers.
//!
//! All whitespace is expected to have been stripped by the caller before a [`Cursor`] is
//! built; the cursor itself only tracks a byte-indexed read position over the remaining
//! characters.

/// A forward-only cursor over a string, exposing the primitives every parser in this crate
/// is built from: `peek`, `next`, `read_until`, `is_next`, `has_next`.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Builds a cursor over `input`, starting at byte offset 0.
    pub fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    /// The current byte offset, for error reporting.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Everything not yet consumed.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// True if at least `n` bytes remain.
    pub fn has_next(&self, n: usize) -> bool {
        self.rest().len() >= n
    }

    /// Returns the next `n` bytes without consuming them, or `None` if fewer remain.
    pub fn peek(&self, n: usize) -> Option<&'a str> {
        let rest = self.rest();
        if rest.len() < n {
            None
        } else {
            Some(&rest[..n])
        }
    }

    /// Consumes and returns the next `n` bytes, or `None` (leaving the cursor unmoved) if
    /// fewer remain.
    pub fn next(&mut self, n: usize) -> Option<&'a str> {
        let s = self.peek(n)?;
        self.pos += n;
        Some(s)
    }

    /// If the remaining input starts with `literal`, consumes it and returns true.
    pub fn is_next(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes and returns every byte up to (but not including) the first occurrence of any
    /// character in `stops`, or to the end of input if none occurs. May return an empty string.
    pub fn read_until(&mut self, stops: &str) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c| stops.contains(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_until_stop_set() {
        let mut c = Cursor::new("foo(bar)");
        assert_eq!(c.read_until("([{"), "foo");
        assert!(c.is_next("("));
        assert_eq!(c.read_until(")"), "bar");
    }

    #[test]
    fn peek_does_not_consume() {
        let mut c = Cursor::new("abc");
        assert_eq!(c.peek(1), Some("a"));
        assert_eq!(c.peek(1), Some("a"));
        assert_eq!(c.next(1), Some("a"));
        assert_eq!(c.peek(1), Some("b"));
    }

    #[test]
    fn has_next_and_rest() {
        let mut c = Cursor::new("xy");
        assert!(c.has_next(2));
        assert!(!c.has_next(3));
        c.next(1);
        assert_eq!(c.rest(), "y");
    }
}
