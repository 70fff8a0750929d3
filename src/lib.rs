//! Pull-style, zero-copy XML tokenizer.
//!
//! Walks an in-memory byte buffer exactly once and yields lexical tokens as
//! borrowed slices of that buffer:
//! - start and end tags, with on-demand attribute parsing
//! - character data (line endings normalized to `\n`)
//! - CDATA sections, comments, directives, processing instructions
//!
//! Strict conformance is traded for throughput. Well-formedness is checked
//! only where it is cheap: unterminated comments and CDATA sections, nameless
//! closing tags, invalid name bytes and unquoted attribute values are
//! reported; everything else the tokenizer takes at face value. Input is an
//! ASCII-superset byte sequence — names are ASCII-only, content is
//! byte-transparent.
//!
//! Tokens borrow from the parser, so holding one blocks the next pull; copy
//! out whatever needs to survive. Errors are not fatal: the cursor always
//! advances, and a tolerant caller can keep pulling and resynchronize at the
//! next `<`.
//!
//! ```
//! use pullxml::{Parser, Token};
//!
//! let mut parser = Parser::new(b"<greeting lang='en'>hello</greeting>", false);
//!
//! let Some(Token::Start(tag)) = parser.next()? else { panic!() };
//! assert_eq!(tag.name(), b"greeting");
//! assert_eq!(tag.get_attribute(b"lang")?, Some(&b"en"[..]));
//!
//! let Some(Token::Text(text)) = parser.next()? else { panic!() };
//! assert_eq!(text.as_ref(), b"hello");
//!
//! let Some(Token::End(end)) = parser.next()? else { panic!() };
//! assert_eq!(end.name, b"greeting");
//!
//! assert!(parser.next()?.is_none());
//! # Ok::<(), pullxml::Error>(())
//! ```

mod attributes;
mod chars;
mod error;
mod parser;
mod scanner;
mod token;

pub use attributes::Attribute;
pub use error::{Error, ErrorKind, Result};
pub use parser::Parser;
pub use token::{EndTag, ProcInst, StartTag, Token};
