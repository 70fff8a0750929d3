//! Typed token views and the frame decoder.
//!
//! Decoding is split in two phases. [`decode`] classifies a framed byte range
//! and produces a [`RawToken`] of spans into the buffer; materializing turns
//! those spans into borrowed slices. Spans first means the parser can save and
//! restore its own state around a decode (that is what makes `peek` cheap to
//! express) and keeps the pending self-close free of self-references when the
//! parser owns its buffer.

use std::borrow::Cow;
use std::ops::Range;
use std::str;

use memchr::memchr;

use crate::attributes::{self, Attribute};
use crate::chars::is_space;
use crate::error::{Error, ErrorKind, Result};
use crate::scanner::{name_end, next_non_space, next_space};

/// One lexical unit of the input.
///
/// Payload slices borrow from the parser's buffer and are valid for as long as
/// the token is held; pulling the next token requires letting go of this one.
/// [`Token::Text`] is the only variant that can own its bytes, and does so
/// only when line endings were normalized.
#[derive(Debug, Clone)]
pub enum Token<'a> {
    /// `<name ...>` — attributes are decoded on demand.
    Start(StartTag<'a>),
    /// `</name>`, or the synthesized pair of a self-closing tag.
    End(EndTag<'a>),
    /// Character data between tags.
    Text(Cow<'a, [u8]>),
    /// The bytes between `<![CDATA[` and `]]>`.
    CData(&'a [u8]),
    /// The bytes between `<!--` and `-->`.
    Comment(&'a [u8]),
    /// The bytes inside `<!` and `>`, e.g. `DOCTYPE html`.
    Directive(&'a [u8]),
    /// `<?target inst?>`.
    ProcInst(ProcInst<'a>),
}

/// A start tag with its attribute bytes still unparsed.
#[derive(Debug, Clone)]
pub struct StartTag<'a> {
    name: &'a [u8],
    attrs: &'a [u8],
    /// Absolute buffer offset of `attrs[0]`, kept for error positions.
    attrs_offset: usize,
    cursor: usize,
}

impl<'a> StartTag<'a> {
    /// The tag name.
    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// The tag name as UTF-8. Names are ASCII-checked, so this only fails on
    /// a slice that never went through the name scanner.
    pub fn name_str(&self) -> Option<&'a str> {
        str::from_utf8(self.name).ok()
    }

    /// True when there are bytes between the name and the closing delimiter.
    pub fn has_attributes(&self) -> bool {
        !self.attrs.is_empty()
    }

    /// Decode the next attribute, in document order. `Ok(None)` after the
    /// last one. On error the iteration cursor stays put.
    pub fn next_attribute(&mut self) -> Result<Option<Attribute<'a>>> {
        match attributes::next_attribute(self.attrs, self.cursor, self.attrs_offset)? {
            Some((attr, cursor)) => {
                self.cursor = cursor;
                Ok(Some(attr))
            }
            None => Ok(None),
        }
    }

    /// Value of the first attribute whose name matches `name`.
    ///
    /// A parsed name containing `:` is compared by the bytes after its last
    /// colon, so `get_attribute(b"href")` finds `xlink:href="..."`. Runs over
    /// a private cursor from the start of the tag; iteration state is not
    /// disturbed. Duplicate names are legal and the first occurrence wins.
    pub fn get_attribute(&self, name: &[u8]) -> Result<Option<&'a [u8]>> {
        let mut cursor = 0;
        while let Some((attr, next)) =
            attributes::next_attribute(self.attrs, cursor, self.attrs_offset)?
        {
            if attr.local_name() == name {
                return Ok(Some(attr.value));
            }
            cursor = next;
        }
        Ok(None)
    }
}

/// A closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndTag<'a> {
    pub name: &'a [u8],
}

impl<'a> EndTag<'a> {
    /// The tag name as UTF-8.
    pub fn name_str(&self) -> Option<&'a str> {
        str::from_utf8(self.name).ok()
    }
}

/// A processing instruction: `<?target inst?>`.
///
/// `inst` is everything after the whitespace run that follows the target, and
/// is empty when nothing but optional whitespace precedes the `?>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcInst<'a> {
    pub target: &'a [u8],
    pub inst: &'a [u8],
}

impl<'a> ProcInst<'a> {
    /// The target as UTF-8.
    pub fn target_str(&self) -> Option<&'a str> {
        str::from_utf8(self.target).ok()
    }
}

/// Span-based token, produced by [`decode`] before any slice is handed out.
#[derive(Debug, Clone)]
pub(crate) enum RawToken {
    Start {
        name: Range<usize>,
        attrs: Range<usize>,
        self_closing: bool,
    },
    End {
        name: Range<usize>,
    },
    Text {
        span: Range<usize>,
        /// Set when the raw bytes contained `\r`; the one allocation in a
        /// successful parse.
        normalized: Option<Vec<u8>>,
    },
    CData(Range<usize>),
    Comment(Range<usize>),
    Directive(Range<usize>),
    ProcInst {
        target: Range<usize>,
        inst: Range<usize>,
    },
}

/// Classify the framed bytes `buf[span]` and decode them into spans.
pub(crate) fn decode(buf: &[u8], span: Range<usize>) -> Result<RawToken> {
    let frame = &buf[span.clone()];
    debug_assert!(!frame.is_empty());

    if frame[0] != b'<' {
        return Ok(decode_text(frame, span));
    }
    match frame[1] {
        b'/' => decode_end_tag(frame, span),
        b'!' => Ok(decode_declaration(frame, span)),
        b'?' => Ok(decode_proc_inst(frame, span)),
        _ => decode_start_tag(frame, span),
    }
}

/// Resolve a raw token's spans against the buffer.
pub(crate) fn materialize(buf: &[u8], raw: RawToken) -> Token<'_> {
    match raw {
        RawToken::Start { name, attrs, .. } => Token::Start(StartTag {
            name: &buf[name],
            attrs_offset: attrs.start,
            attrs: &buf[attrs],
            cursor: 0,
        }),
        RawToken::End { name } => Token::End(EndTag { name: &buf[name] }),
        RawToken::Text { span, normalized } => Token::Text(match normalized {
            Some(owned) => Cow::Owned(owned),
            None => Cow::Borrowed(&buf[span]),
        }),
        RawToken::CData(span) => Token::CData(&buf[span]),
        RawToken::Comment(span) => Token::Comment(&buf[span]),
        RawToken::Directive(span) => Token::Directive(&buf[span]),
        RawToken::ProcInst { target, inst } => Token::ProcInst(ProcInst {
            target: &buf[target],
            inst: &buf[inst],
        }),
    }
}

fn decode_text(frame: &[u8], span: Range<usize>) -> RawToken {
    let normalized = if memchr(b'\r', frame).is_some() {
        Some(normalize_line_ends(frame))
    } else {
        None
    };
    RawToken::Text { span, normalized }
}

/// `\r\n` and lone `\r` both become `\n`.
fn normalize_line_ends(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\r' {
            out.push(b'\n');
            if raw.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
        } else {
            out.push(raw[i]);
        }
        i += 1;
    }
    out
}

fn decode_end_tag(frame: &[u8], span: Range<usize>) -> Result<RawToken> {
    // Strip '</' and '>'. Whatever trails the name (whitespace in practice)
    // is ignored: `</spaces   >` closes `spaces`.
    let inner = &frame[2..frame.len() - 1];
    let n = name_end(inner);
    if n == 0 {
        return Err(Error::new(ErrorKind::InvalidClosingTag, span.start));
    }
    Ok(RawToken::End {
        name: span.start + 2..span.start + 2 + n,
    })
}

fn decode_start_tag(frame: &[u8], span: Range<usize>) -> Result<RawToken> {
    if frame.len() < 3 {
        return Err(Error::new(ErrorKind::NotATag, span.start));
    }
    let self_closing = frame[frame.len() - 2] == b'/';
    let inner = &frame[1..frame.len() - if self_closing { 2 } else { 1 }];

    let n = name_end(inner);
    if n == 0 {
        let b = inner.first().copied().unwrap_or(b'>');
        return Err(Error::new(ErrorKind::InvalidNameStart(b), span.start + 1));
    }
    // Attributes must be separated from the name by whitespace; any other
    // terminator byte (a non-ASCII byte in particular) is a name error.
    if n < inner.len() && !is_space(inner[n]) {
        return Err(Error::new(
            ErrorKind::InvalidNameByte(inner[n]),
            span.start + 1 + n,
        ));
    }

    let a = n + next_non_space(&inner[n..]);
    Ok(RawToken::Start {
        name: span.start + 1..span.start + 1 + n,
        attrs: span.start + 1 + a..span.start + 1 + inner.len(),
        self_closing,
    })
}

fn decode_declaration(frame: &[u8], span: Range<usize>) -> RawToken {
    // The framer already vetted the shape, so classification is by prefix.
    if frame.starts_with(b"<!--") {
        RawToken::Comment(span.start + 4..span.end - 3)
    } else if frame.starts_with(b"<![CDATA[") {
        RawToken::CData(span.start + 9..span.end - 3)
    } else {
        // Everything inside '<' and '>' with the leading '!' stripped:
        // `<!DOCTYPE html>` carries `DOCTYPE html`.
        RawToken::Directive(span.start + 2..span.end - 1)
    }
}

fn decode_proc_inst(frame: &[u8], span: Range<usize>) -> RawToken {
    // Strip '<?' and '?>' (a bare '>' close is tolerated).
    let mut inner_end = frame.len() - 1;
    if inner_end > 2 && frame[inner_end - 1] == b'?' {
        inner_end -= 1;
    }
    let inner = &frame[2..inner_end];

    let t = next_space(inner);
    let rest = t + next_non_space(&inner[t..]);
    RawToken::ProcInst {
        target: span.start + 2..span.start + 2 + t,
        inst: span.start + 2 + rest..span.start + 2 + inner.len(),
    }
}
