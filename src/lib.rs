// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email content extraction for safe display
//!
//! Takes a raw MIME message and produces a [`DisplayableEmail`]: basic
//! headers plus one readable body, HTML preferred over plain text, decoded
//! from its transfer encoding and sanitized when it is HTML.
//!
//! # Pipeline
//!
//! - [`parse`] builds the header set and MIME tree
//! - [`select`] finds the first part of a wanted type
//! - [`decode`] reverses the transfer encoding and charset
//! - [`sanitize`] filters HTML through an allow-list policy
//! - [`extract`] runs all of the above and never fails
//!
//! # Example
//!
//! ```rust
//! use mailview::{BodyKind, extract};
//!
//! let raw = b"Subject: Hi\r\nContent-Type: text/html\r\n\r\n<b>Hi</b><script>alert(1)</script>";
//! let email = extract(raw);
//!
//! assert_eq!(email.subject.as_deref(), Some("Hi"));
//! assert_eq!(email.body.kind, BodyKind::Html);
//! assert!(!email.body.content.contains("<script>"));
//! ```

mod decode;
mod error;
mod extract;
mod parser;
mod sanitize;
mod select;
mod store;
mod types;

pub use decode::{decode, decode_base64, decode_quoted_printable, decode_text, decode_transfer};
pub use error::{MailError, Result};
pub use extract::{Extractor, extract};
pub use parser::{MAX_DEPTH, parse};
pub use sanitize::{PLACEHOLDER_URL, SanitizePolicy, Sanitizer, UrlRewrite, normalize_url, sanitize};
pub use select::{Parts, select};
pub use store::{
    DirStore, MemoryStore, MessageStore, MessageSummary, NO_SUBJECT, READ_ERROR, StoreConfig,
    StoredMessage, UNKNOWN_RECIPIENT, summarize,
};
pub use types::*;
