//! The pull parser.
//!
//! Owns the buffer reference, the cursor and the one-slot pending self-close,
//! and drives the framer and decoder from [`next`](Parser::next). Strictly
//! sequential: every returned token borrows the parser, so the borrow checker
//! enforces the "copy what you keep before the next call" contract.

use std::borrow::Cow;
use std::ops::Range;

use crate::error::Result;
use crate::scanner;
use crate::token::{self, RawToken, Token};

/// Pull-style tokenizer over an in-memory XML document.
///
/// The buffer is scanned exactly once; token payloads are borrowed slices of
/// it. The only allocations on a successful parse are the optional defensive
/// buffer copy at construction and the owned text produced when character
/// data needs its line endings normalized.
///
/// A self-closing tag produces two events: the start tag, then an end tag
/// with the same name on the immediately following [`next`](Parser::next),
/// without consuming further input.
///
/// ```
/// use pullxml::{Parser, Token};
///
/// let mut parser = Parser::new(b"<doc kind='note'>hi<br/></doc>", false);
/// let mut names = Vec::new();
/// while let Some(token) = parser.next()? {
///     if let Token::Start(tag) = token {
///         names.push(tag.name_str().unwrap().to_string());
///     }
/// }
/// assert_eq!(names, ["doc", "br"]);
/// # Ok::<(), pullxml::Error>(())
/// ```
pub struct Parser<'buf> {
    buf: Cow<'buf, [u8]>,
    /// Offset of the first byte not yet consumed. Non-decreasing.
    pos: usize,
    /// Name span of a self-closing tag whose end event is still owed.
    pending_end: Option<Range<usize>>,
}

impl<'buf> Parser<'buf> {
    /// Create a parser over `buf`.
    ///
    /// With `must_copy` the parser keeps its own copy of the input; otherwise
    /// it borrows, and the borrow pins `buf` unchanged for the parser's
    /// lifetime.
    pub fn new(buf: &'buf [u8], must_copy: bool) -> Self {
        let buf = if must_copy {
            Cow::Owned(buf.to_vec())
        } else {
            Cow::Borrowed(buf)
        };
        Parser {
            buf,
            pos: 0,
            pending_end: None,
        }
    }

    /// Byte offset of the first unconsumed byte. After end of input this
    /// equals the buffer length.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Pull the next token. `Ok(None)` means end of input, reported
    /// distinctly from errors; errors are not fatal and later calls keep
    /// making progress.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Token<'_>>> {
        let raw = self.advance()?;
        Ok(raw.map(|raw| token::materialize(&self.buf, raw)))
    }

    /// Look at the next token without consuming it.
    ///
    /// Repeated peeks return the same token and leave the parser untouched;
    /// the following [`next`](Parser::next) re-does the framing work, which
    /// is fine for interactive lookahead but not meant for hot loops.
    pub fn peek(&mut self) -> Result<Option<Token<'_>>> {
        let pos = self.pos;
        let pending_end = self.pending_end.clone();
        let raw = self.advance();
        self.pos = pos;
        self.pending_end = pending_end;
        Ok(raw?.map(|raw| token::materialize(&self.buf, raw)))
    }

    /// Frame and decode one token, updating cursor and pending state.
    ///
    /// Span-based so that `peek` can restore the parser afterwards without
    /// holding any borrow of the buffer.
    fn advance(&mut self) -> Result<Option<RawToken>> {
        if let Some(name) = self.pending_end.take() {
            // Synthesized end event of a self-closing tag; no input consumed.
            return Ok(Some(RawToken::End { name }));
        }
        if self.pos >= self.buf.len() {
            return Ok(None);
        }

        let len = match scanner::token_len(&self.buf[self.pos..], self.pos) {
            Ok(len) => len,
            Err(err) => {
                // Step past the offending byte so repeated calls make
                // progress; tolerant callers resync at the next '<'.
                self.pos += 1;
                return Err(err);
            }
        };
        debug_assert!(len > 0);

        let span = self.pos..self.pos + len;
        // Advance even when decoding fails below, for the same reason.
        self.pos = span.end;

        let raw = token::decode(&self.buf, span)?;
        if let RawToken::Start {
            ref name,
            self_closing: true,
            ..
        } = raw
        {
            self.pending_end = Some(name.clone());
        }
        Ok(Some(raw))
    }
}
