//! Core types for parsed and extracted messages

use crate::error::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when a message has neither an HTML nor a plain-text part
pub const NO_READABLE_CONTENT: &str = "No readable content";

/// Final extraction result handed to a renderer.
///
/// When `body.kind` is [`BodyKind::Html`] the content has already been
/// sanitized and can be injected into a display surface as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayableEmail {
    /// Sender
    pub from: Option<HeaderValue>,

    /// Primary recipients
    pub to: Option<HeaderValue>,

    /// Decoded subject line
    pub subject: Option<String>,

    /// Date header
    pub date: Option<MessageDate>,

    /// Selected, decoded and (for HTML) sanitized body
    pub body: DecodedContent,
}

impl DisplayableEmail {
    /// Serialize for a renderer that consumes JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How a decoded body must be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Html,
    Text,
}

/// Decoded content of one part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedContent {
    pub content: String,

    #[serde(rename = "type")]
    pub kind: BodyKind,

    /// Content could not be fully decoded and was stringified best-effort
    pub fallback: bool,
}

impl DecodedContent {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: BodyKind::Text,
            fallback: false,
        }
    }

    #[must_use]
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: BodyKind::Html,
            fallback: false,
        }
    }

    /// Body used when no readable part exists
    #[must_use]
    pub fn placeholder() -> Self {
        Self::text(NO_READABLE_CONTENT)
    }

    #[must_use]
    pub const fn is_html(&self) -> bool {
        matches!(self.kind, BodyKind::Html)
    }
}

/// Primary/subtype pair of a content type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// `text/plain`
    PlainText,

    /// `text/html`
    Html,

    /// `multipart/<subtype>`
    Multipart(String),

    /// Any other well-formed `type/subtype`, lowercased
    Other(String),
}

impl MediaType {
    /// Build from a `type/subtype` string. Malformed values map to
    /// `application/octet-stream`.
    #[must_use]
    pub fn from_essence(essence: &str) -> Self {
        let essence = essence.trim().to_ascii_lowercase();
        let Some((primary, subtype)) = essence.split_once('/') else {
            return Self::octet_stream();
        };
        if !is_token(primary) || !is_token(subtype) {
            return Self::octet_stream();
        }

        match (primary, subtype) {
            ("text", "plain") => Self::PlainText,
            ("text", "html") => Self::Html,
            ("multipart", sub) => Self::Multipart(sub.to_string()),
            _ => Self::Other(format!("{primary}/{subtype}")),
        }
    }

    #[must_use]
    pub fn octet_stream() -> Self {
        Self::Other("application/octet-stream".into())
    }

    /// The `type/subtype` string
    #[must_use]
    pub fn essence(&self) -> String {
        match self {
            Self::PlainText => "text/plain".into(),
            Self::Html => "text/html".into(),
            Self::Multipart(sub) => format!("multipart/{sub}"),
            Self::Other(essence) => essence.clone(),
        }
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.essence())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'&' | b'^' | b'_' | b'.' | b'+' | b'-'
                )
        })
}

/// Parsed `Content-Type` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub media: MediaType,

    /// Parameters with lowercased names and unquoted values
    pub params: Vec<(String, String)>,
}

impl ContentType {
    /// Parse a header value such as `text/html; charset="utf-8"`
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let (essence, rest) = value.split_once(';').unwrap_or((value, ""));
        let media = MediaType::from_essence(essence);
        let params = if media == MediaType::octet_stream() && !essence_is_octet(essence) {
            Vec::new()
        } else {
            parse_params(rest)
        };

        Self { media, params }
    }

    /// Default for parts without a `Content-Type` header
    #[must_use]
    pub const fn text_plain() -> Self {
        Self {
            media: MediaType::PlainText,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn octet_stream() -> Self {
        Self {
            media: MediaType::octet_stream(),
            params: Vec::new(),
        }
    }

    /// Case-insensitive parameter lookup
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary").filter(|b| !b.is_empty())
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media)
    }
}

fn essence_is_octet(essence: &str) -> bool {
    essence.trim().eq_ignore_ascii_case("application/octet-stream")
}

/// Split `; a=b; c="d; e"` into name/value pairs, honouring quoted strings
fn parse_params(s: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut segment = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in s.chars().chain(std::iter::once(';')) {
        if escaped {
            segment.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                if let Some((name, value)) = segment.split_once('=') {
                    let name = name.trim().to_ascii_lowercase();
                    if !name.is_empty() {
                        params.push((name, value.trim().to_string()));
                    }
                }
                segment.clear();
            }
            _ => segment.push(c),
        }
    }

    params
}

/// Declared `Content-Transfer-Encoding`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEncoding {
    #[default]
    SevenBit,
    EightBit,
    QuotedPrintable,
    Base64,
    Binary,
}

impl TransferEncoding {
    /// Unknown mechanisms are treated as `7bit`
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "quoted-printable" => Self::QuotedPrintable,
            "base64" => Self::Base64,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
            Self::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,

    /// Address (e.g., "john@example.com")
    pub address: String,
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Structured header value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderValue {
    /// Address-bearing header that parsed into mailboxes
    Addresses(Vec<Mailbox>),

    /// Any other value, decoded to text
    Text(String),
}

impl HeaderValue {
    #[must_use]
    pub fn first_address(&self) -> Option<&Mailbox> {
        match self {
            Self::Addresses(list) => list.first(),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addresses(list) => {
                for (i, mailbox) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{mailbox}")?;
                }
                Ok(())
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// `Date` header, parsed when it follows RFC 2822
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDate {
    pub raw: String,
    pub parsed: Option<DateTime<FixedOffset>>,
}

impl MessageDate {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        // Trailing zone comments such as "(UTC)" are not accepted by chrono
        let without_comment = trimmed
            .rfind('(')
            .filter(|_| trimmed.ends_with(')'))
            .map_or(trimmed, |idx| trimmed[..idx].trim_end());

        Self {
            raw: trimmed.to_string(),
            parsed: DateTime::parse_from_rfc2822(without_comment).ok(),
        }
    }
}

impl fmt::Display for MessageDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One header field as it appeared in the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    /// Field name with its original casing
    pub name: String,

    /// Unfolded value with encoded words decoded
    pub value: String,

    /// The raw field bytes including folded continuation lines
    #[serde(skip)]
    pub raw: Vec<u8>,
}

/// Ordered collection of header fields with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSet {
    fields: Vec<HeaderField>,
}

impl HeaderSet {
    #[must_use]
    pub const fn new(fields: Vec<HeaderField>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.fields.iter()
    }

    /// First field with the given name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&HeaderField> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Decoded value of the first field with the given name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    /// Decoded values of every field with the given name, in order
    #[must_use]
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    /// Address list of the first field with the given name. Values that do
    /// not parse as addresses degrade to [`HeaderValue::Text`].
    #[must_use]
    pub fn addresses(&self, name: &str) -> Option<HeaderValue> {
        let field = self.field(name)?;

        let mailboxes: Vec<Mailbox> = mailparse::parse_header(&field.raw)
            .ok()
            .and_then(|(header, _)| mailparse::addrparse_header(&header).ok())
            .map(|list| {
                list.iter()
                    .flat_map(mailboxes_of)
                    .filter(|m| m.address.contains('@'))
                    .collect()
            })
            .unwrap_or_default();

        if mailboxes.is_empty() {
            Some(HeaderValue::Text(field.value.clone()))
        } else {
            Some(HeaderValue::Addresses(mailboxes))
        }
    }

    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.get("subject").map(str::to_string)
    }

    #[must_use]
    pub fn date(&self) -> Option<MessageDate> {
        self.get("date").map(MessageDate::parse)
    }
}

fn mailboxes_of(addr: &mailparse::MailAddr) -> Vec<Mailbox> {
    let single = |info: &mailparse::SingleInfo| Mailbox {
        name: info.display_name.clone().filter(|n| !n.is_empty()),
        address: info.addr.clone(),
    };

    match addr {
        mailparse::MailAddr::Single(info) => vec![single(info)],
        mailparse::MailAddr::Group(group) => group.addrs.iter().map(single).collect(),
    }
}

/// A node in the MIME tree
///
/// Multipart nodes carry children and no body of their own; every other
/// node is a leaf holding its still-encoded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimePart {
    pub content_type: ContentType,
    pub transfer_encoding: TransferEncoding,

    /// Raw content as found between the part headers and the next delimiter
    #[serde(skip)]
    pub body: Vec<u8>,

    pub children: Vec<MimePart>,
}

impl MimePart {
    #[must_use]
    pub const fn leaf(
        content_type: ContentType,
        transfer_encoding: TransferEncoding,
        body: Vec<u8>,
    ) -> Self {
        Self {
            content_type,
            transfer_encoding,
            body,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn multipart(content_type: ContentType, children: Vec<Self>) -> Self {
        Self {
            content_type,
            transfer_encoding: TransferEncoding::SevenBit,
            body: Vec::new(),
            children,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub const fn media(&self) -> &MediaType {
        &self.content_type.media
    }
}

/// Parsed message: top-level headers plus the MIME tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub headers: HeaderSet,
    pub root: MimePart,
}
