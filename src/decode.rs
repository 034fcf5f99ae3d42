//! Content decoding: transfer encodings and character sets

use crate::error::{MailError, Result};
use crate::types::{BodyKind, DecodedContent, MediaType, MimePart, TransferEncoding};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::{Captures, Regex};
use std::borrow::Cow;
use tracing::{debug, warn};

// Soft line break or a two-digit hex escape
static QP_ESCAPE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"=(?:\r?\n|([0-9A-Fa-f]{2}))").unwrap());

/// Decode one leaf part into text.
///
/// Never fails: a transfer encoding that cannot be reversed yields the raw
/// content, and malformed charset sequences are replaced. Both set the
/// `fallback` flag.
#[must_use]
pub fn decode(part: &MimePart) -> DecodedContent {
    let kind = if *part.media() == MediaType::Html {
        BodyKind::Html
    } else {
        BodyKind::Text
    };
    let charset = part.content_type.charset();

    let (content, fallback) = match decode_transfer(&part.body, part.transfer_encoding) {
        Ok(bytes) => {
            let (text, had_errors) = decode_text(&bytes, charset);
            if had_errors {
                warn!("Malformed {} sequences replaced", charset.unwrap_or("utf-8"));
            }
            (text, had_errors)
        }
        Err(err) => {
            warn!("{err}; using raw {} content", part.transfer_encoding);
            (String::from_utf8_lossy(&part.body).into_owned(), true)
        }
    };

    DecodedContent {
        content,
        kind,
        fallback,
    }
}

/// Reverse a Content-Transfer-Encoding. Identity encodings borrow the input.
pub fn decode_transfer(body: &[u8], encoding: TransferEncoding) -> Result<Cow<'_, [u8]>> {
    match encoding {
        TransferEncoding::QuotedPrintable => Ok(Cow::Owned(decode_quoted_printable(body))),
        TransferEncoding::Base64 => decode_base64(body).map(Cow::Owned),
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
            Ok(Cow::Borrowed(body))
        }
    }
}

/// Decode quoted-printable. Soft line breaks are removed and `=XX` escapes
/// become bytes; escapes that are not two hex digits are kept verbatim.
#[must_use]
pub fn decode_quoted_printable(input: &[u8]) -> Vec<u8> {
    QP_ESCAPE
        .replace_all(input, |caps: &Captures<'_>| {
            caps.get(1).map_or_else(Vec::new, |hex| {
                let digits = hex.as_bytes();
                vec![(hex_value(digits[0]) << 4) | hex_value(digits[1])]
            })
        })
        .into_owned()
}

const fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

/// Decode standard-alphabet base64, ignoring whitespace
pub fn decode_base64(input: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(compact)
        .map_err(|e| MailError::Decode(format!("invalid base64: {e}")))
}

/// Convert bytes to text using the declared charset, UTF-8 when absent or
/// unknown. Returns whether any sequence had to be replaced.
#[must_use]
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> (String, bool) {
    let encoding = charset.map_or(UTF_8, |label| {
        Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
            debug!("Unknown charset {label:?}, assuming utf-8");
            UTF_8
        })
    });

    let (text, _, had_errors) = encoding.decode(bytes);
    (text.into_owned(), had_errors)
}
