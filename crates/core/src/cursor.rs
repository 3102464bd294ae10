//! Read head over a single run of inline text.

use fancy_regex::Regex;

/// Snapshot of a [`Cursor`] position, returned by [`Cursor::save_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    offset: usize,
}

/// A cursor over a text run that inline parsers consume.
///
/// Positions are byte offsets that always sit on a `char` boundary. The
/// optional `lead` is the character that logically precedes the run (for
/// example the closing `*` of an emphasis span); `peek(-1)` at offset 0
/// reports it.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    lead: Option<char>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `input`, with nothing before it.
    pub fn new(input: &'a str) -> Self {
        Self::with_lead(input, None)
    }

    /// Creates a cursor at the start of `input`, preceded by `lead`.
    pub fn with_lead(input: &'a str, lead: Option<char>) -> Self {
        Self {
            input,
            offset: 0,
            lead,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// The unconsumed part of the input.
    pub fn remainder(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Character under the cursor.
    pub fn current(&self) -> Option<char> {
        self.peek(0)
    }

    /// Looks `offset` characters away from the current position without
    /// consuming anything. Negative offsets look backwards; looking one past
    /// the start of the run yields the lead character.
    pub fn peek(&self, offset: isize) -> Option<char> {
        if offset >= 0 {
            return self.remainder().chars().nth(offset.unsigned_abs());
        }

        // Walk back only as far as asked; the lead sits one step past the start.
        let mut before = self.input[..self.offset].chars();
        for _ in 1..offset.unsigned_abs() {
            before.next_back()?;
        }
        match before.next_back() {
            Some(ch) => Some(ch),
            None => self.lead,
        }
    }

    pub fn save_state(&self) -> CursorState {
        CursorState {
            offset: self.offset,
        }
    }

    pub fn restore_state(&mut self, state: CursorState) {
        self.offset = state.offset;
    }

    /// Moves past the current character. Does nothing at the end of input.
    pub fn advance(&mut self) {
        if let Some(ch) = self.current() {
            self.offset += ch.len_utf8();
        }
    }

    /// Matches `pattern` against the remainder and consumes the match.
    ///
    /// Only a non-empty match starting exactly at the current position
    /// counts; anything else leaves the cursor untouched and returns `None`.
    pub fn match_pattern(&mut self, pattern: &Regex) -> Option<&'a str> {
        let remainder = self.remainder();
        let found = match pattern.find(remainder) {
            Ok(found) => found?,
            Err(err) => {
                log::warn!(
                    "pattern {:?} failed at offset {}: {err}",
                    pattern.as_str(),
                    self.offset
                );
                return None;
            }
        };

        if found.start() != 0 || found.end() == 0 {
            return None;
        }

        self.offset += found.end();
        Some(found.as_str())
    }
}
