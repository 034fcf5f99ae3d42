//! Extraction pipeline: parse, select, decode, sanitize

use crate::decode::decode;
use crate::parser::parse;
use crate::sanitize::Sanitizer;
use crate::select::select;
use crate::types::{DecodedContent, DisplayableEmail, MediaType, Message};
use tracing::debug;

/// Extract a displayable email with the default sanitize policy
#[must_use]
pub fn extract(raw: &[u8]) -> DisplayableEmail {
    Extractor::default().extract(raw)
}

/// Runs the extraction pipeline with a configured sanitizer
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    sanitizer: Sanitizer,
}

impl Extractor {
    #[must_use]
    pub const fn new(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }

    /// Turn raw message bytes into a [`DisplayableEmail`]. Never fails; each
    /// stage degrades instead (absent headers, raw or placeholder body, empty
    /// HTML when sanitization faults).
    #[must_use]
    pub fn extract(&self, raw: &[u8]) -> DisplayableEmail {
        let message = parse(raw);
        let body = self.body(&message);

        DisplayableEmail {
            from: message.headers.addresses("from"),
            to: message.headers.addresses("to"),
            subject: message.headers.subject(),
            date: message.headers.date(),
            body,
        }
    }

    /// Select, decode and sanitize the body of a parsed message.
    ///
    /// HTML is preferred over plain text. Without either the placeholder
    /// body is returned.
    #[must_use]
    pub fn body(&self, message: &Message) -> DecodedContent {
        let Some(part) = select(&message.root, &MediaType::Html)
            .or_else(|| select(&message.root, &MediaType::PlainText))
        else {
            debug!("No text/html or text/plain part found");
            return DecodedContent::placeholder();
        };

        debug!(
            "Selected {} part ({})",
            part.content_type, part.transfer_encoding
        );

        let mut decoded = decode(part);
        if decoded.is_html() {
            decoded.content = self.sanitizer.sanitize(&decoded.content);
        }
        decoded
    }
}
