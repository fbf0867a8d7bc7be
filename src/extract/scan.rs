//! Quote-aware scanning primitives.
//!
//! Both quote kinds are recognised. Inside a quoted run a doubled delimiter
//! (`""` or `''`) is a literal quote character and keeps the run open.

use std::iter::Peekable;
use std::str::CharIndices;

/// Iterator over the characters of a text that lie outside quoted runs.
///
/// Quote characters themselves are never yielded.
pub(crate) struct Unquoted<'a> {
    chars: Peekable<CharIndices<'a>>,
    open: Option<char>,
}

pub(crate) fn unquoted(text: &str) -> Unquoted<'_> {
    Unquoted {
        chars: text.char_indices().peekable(),
        open: None,
    }
}

impl Iterator for Unquoted<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((i, c)) = self.chars.next() {
            match self.open {
                Some(quote) if c == quote => {
                    if self.chars.peek().map(|&(_, next)| next) == Some(quote) {
                        self.chars.next();
                    } else {
                        self.open = None;
                    }
                }
                Some(_) => {}
                None if c == '"' || c == '\'' => self.open = Some(c),
                None => return Some((i, c)),
            }
        }
        None
    }
}

/// The first statement of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Statement<'a> {
    /// Ends with a semicolon found outside any quoted run
    Terminated(&'a str),
    /// No unquoted semicolon; the whole trimmed text
    Unterminated(&'a str),
}

impl<'a> Statement<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Statement::Terminated(s) | Statement::Unterminated(s) => s,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Statement::Terminated(_))
    }
}

pub(crate) fn first_statement(text: &str) -> Statement<'_> {
    match unquoted(text).find(|&(_, c)| c == ';') {
        Some((i, _)) => Statement::Terminated(text[..=i].trim()),
        None => Statement::Unterminated(text.trim()),
    }
}

/// Text up to and including the first semicolon outside any quoted run, or
/// the whole trimmed text when there is none.
pub fn truncate_to_first_statement(text: &str) -> &str {
    first_statement(text).as_str()
}

/// Argument text of the call whose opening parenthesis is at byte `open`.
///
/// Runs to the end of the text when the call is never closed.
pub(crate) fn call_arguments(text: &str, open: usize) -> &str {
    let mut depth = 0usize;
    for (i, c) in unquoted(&text[open..]) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[open + 1..open + i];
                }
            }
            _ => {}
        }
    }
    &text[open + 1..]
}

/// Split argument text on commas that are outside quotes and nested parentheses.
///
/// Arguments keep their raw (still escaped) text, trimmed.
pub(crate) fn split_arguments(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in unquoted(args) {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < args.len() {
        parts.push(args[start..].trim());
    }
    parts
}
