//! MIME tree parser
//!
//! Turns raw message bytes into a [`Message`]: the top-level header set and
//! a tree of [`MimePart`]s. Parsing never fails. Structural damage such as a
//! missing header separator, absent boundaries or an unterminated multipart
//! degrades to the best partial tree, down to a single `text/plain` leaf
//! holding the whole input.

use crate::types::{
    ContentType, HeaderField, HeaderSet, MediaType, Message, MimePart, TransferEncoding,
};
use tracing::{debug, warn};

/// Multipart nesting below this depth is kept opaque
pub const MAX_DEPTH: usize = 32;

/// Parse a raw message into headers and a MIME tree
#[must_use]
pub fn parse(raw: &[u8]) -> Message {
    let (headers, body) = split_entity(raw);
    let root = build_part(&headers, body, 0);

    debug!(
        "Parsed message: {} header fields, root {}",
        headers.len(),
        root.content_type
    );

    Message { headers, root }
}

/// Split an entity into its header fields and body.
///
/// Input without a blank line after a well-formed header block is treated as
/// a headerless body.
fn split_entity(raw: &[u8]) -> (HeaderSet, &[u8]) {
    let Some((head, body)) = split_at_blank_line(raw) else {
        debug!("No header/body separator, treating input as headerless body");
        return (HeaderSet::default(), raw);
    };

    parse_header_block(head).map_or_else(
        || {
            debug!("Malformed header block, treating input as headerless body");
            (HeaderSet::default(), raw)
        },
        |fields| (HeaderSet::new(fields), body),
    )
}

/// Find the first empty line. Returns the header block (with its final line
/// terminator) and everything after the empty line.
fn split_at_blank_line(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(body) = raw.strip_prefix(b"\r\n") {
        return Some((&raw[..0], body));
    }
    if let Some(body) = raw.strip_prefix(b"\n") {
        return Some((&raw[..0], body));
    }

    let mut pos = 0;
    while let Some(offset) = raw[pos..].iter().position(|&b| b == b'\n') {
        let nl = pos + offset;
        let rest = &raw[nl + 1..];
        if let Some(body) = rest.strip_prefix(b"\r\n") {
            return Some((&raw[..=nl], body));
        }
        if let Some(body) = rest.strip_prefix(b"\n") {
            return Some((&raw[..=nl], body));
        }
        pos = nl + 1;
    }

    None
}

/// Split a header block into fields, joining folded continuation lines.
/// Returns `None` when the block does not start with a header field.
fn parse_header_block(head: &[u8]) -> Option<Vec<HeaderField>> {
    let mut raw_fields: Vec<Vec<u8>> = Vec::new();

    for (index, line) in lines(head).enumerate() {
        let content = trim_line_end(line);
        if content.is_empty() {
            continue;
        }

        // mbox envelope line
        if index == 0 && content.starts_with(b"From ") {
            continue;
        }

        if matches!(content.first(), Some(b' ' | b'\t')) {
            match raw_fields.last_mut() {
                Some(field) => field.extend_from_slice(line),
                None => return None,
            }
        } else if is_field_line(content) {
            raw_fields.push(line.to_vec());
        } else if raw_fields.is_empty() {
            return None;
        } else {
            debug!(
                "Skipping malformed header line: {}",
                String::from_utf8_lossy(content)
            );
        }
    }

    Some(raw_fields.into_iter().map(header_field).collect())
}

fn is_field_line(line: &[u8]) -> bool {
    line.iter().position(|&b| b == b':').is_some_and(|colon| {
        colon > 0 && line[..colon].iter().all(|&b| (33..=126).contains(&b))
    })
}

fn header_field(raw: Vec<u8>) -> HeaderField {
    if let Ok((header, _)) = mailparse::parse_header(&raw) {
        return HeaderField {
            name: header.get_key(),
            value: header.get_value().trim().to_string(),
            raw,
        };
    }

    // mailparse rejected the field, unfold it by hand
    let text = String::from_utf8_lossy(&raw).into_owned();
    let (name, value) = text.split_once(':').unwrap_or((text.as_str(), ""));
    let value = value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    HeaderField {
        name: name.trim().to_string(),
        value,
        raw,
    }
}

fn build_part(headers: &HeaderSet, body: &[u8], depth: usize) -> MimePart {
    let content_type = headers
        .get("content-type")
        .map_or_else(ContentType::text_plain, ContentType::parse);
    let encoding = headers
        .get("content-transfer-encoding")
        .map_or_else(TransferEncoding::default, TransferEncoding::from_header);

    if !matches!(content_type.media, MediaType::Multipart(_)) {
        return MimePart::leaf(content_type, encoding, body.to_vec());
    }

    if depth >= MAX_DEPTH {
        warn!("Multipart nesting exceeds {MAX_DEPTH} levels, keeping part opaque");
        return MimePart::leaf(ContentType::octet_stream(), encoding, body.to_vec());
    }

    let Some(boundary) = content_type.boundary().map(str::to_string) else {
        debug!("{} without boundary, treating as text", content_type.media);
        return MimePart::leaf(ContentType::text_plain(), encoding, body.to_vec());
    };

    let sections = split_multipart(body, &boundary);
    if sections.is_empty() {
        debug!("No delimiter for boundary {boundary:?}, treating as text");
        return MimePart::leaf(ContentType::text_plain(), encoding, body.to_vec());
    }

    let children = sections
        .into_iter()
        .map(|section| {
            let (part_headers, part_body) = split_entity(section);
            build_part(&part_headers, part_body, depth + 1)
        })
        .collect();

    MimePart::multipart(content_type, children)
}

/// Cut a multipart body into the sections between boundary delimiters.
///
/// The preamble and the epilogue are dropped. A missing closing delimiter
/// leaves the last section running to the end of the body.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let mut sections = Vec::new();
    let mut start: Option<usize> = None;
    let mut pos = 0;

    for line in lines(body) {
        let line_start = pos;
        pos += line.len();

        let Some(rest) = trim_line_end(line).strip_prefix(delimiter.as_bytes()) else {
            continue;
        };
        let closing = rest.starts_with(b"--");
        if !closing && !rest.is_empty() {
            continue;
        }

        if let Some(section_start) = start.take() {
            sections.push(strip_line_break(&body[section_start..line_start]));
        }
        if closing {
            return sections;
        }
        start = Some(pos);
    }

    if let Some(section_start) = start {
        sections.push(&body[section_start..]);
    }

    sections
}

/// Lines including their terminators
fn lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split_inclusive(|&b| b == b'\n')
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b'\r' | b'\n' | b' ' | b'\t'))
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// The line break before a delimiter belongs to the delimiter
fn strip_line_break(section: &[u8]) -> &[u8] {
    section
        .strip_suffix(b"\r\n")
        .or_else(|| section.strip_suffix(b"\n"))
        .unwrap_or(section)
}
