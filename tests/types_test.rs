use mailview::*;

// --- MediaType ---

#[test]
fn test_media_type_from_essence() {
    assert_eq!(MediaType::from_essence("text/plain"), MediaType::PlainText);
    assert_eq!(MediaType::from_essence(" TEXT/HTML "), MediaType::Html);
    assert_eq!(
        MediaType::from_essence("multipart/Related"),
        MediaType::Multipart("related".into())
    );
    assert_eq!(
        MediaType::from_essence("application/x-custom"),
        MediaType::Other("application/x-custom".into())
    );
}

#[test]
fn test_media_type_malformed() {
    for value in ["", "text", "text/", "/html", "te xt/plain", "text/ht@ml"] {
        assert_eq!(MediaType::from_essence(value), MediaType::octet_stream(), "{value:?}");
    }
}

#[test]
fn test_media_type_essence_display() {
    assert_eq!(MediaType::Html.essence(), "text/html");
    assert_eq!(MediaType::Multipart("mixed".into()).to_string(), "multipart/mixed");
    assert!(MediaType::Multipart("mixed".into()).is_multipart());
    assert!(!MediaType::PlainText.is_multipart());
}

// --- ContentType ---

#[test]
fn test_content_type_params() {
    let ct = ContentType::parse("multipart/mixed; boundary=\"a; b=c\"; Charset=UTF-8");

    assert_eq!(ct.media, MediaType::Multipart("mixed".into()));
    assert_eq!(ct.boundary(), Some("a; b=c"));
    assert_eq!(ct.charset(), Some("UTF-8"));
    assert_eq!(ct.param("CHARSET"), Some("UTF-8"));
    assert_eq!(ct.param("name"), None);
}

#[test]
fn test_content_type_escaped_quote() {
    let ct = ContentType::parse(r#"text/plain; name="say \"hi\".txt""#);

    assert_eq!(ct.param("name"), Some(r#"say "hi".txt"#));
}

#[test]
fn test_content_type_empty_boundary() {
    let ct = ContentType::parse("multipart/mixed; boundary=\"\"");

    assert_eq!(ct.boundary(), None);
}

#[test]
fn test_content_type_malformed_drops_params() {
    let ct = ContentType::parse("garbage; charset=utf-8");

    assert_eq!(ct, ContentType::octet_stream());
}

#[test]
fn test_content_type_default() {
    let ct = ContentType::text_plain();

    assert_eq!(ct.media, MediaType::PlainText);
    assert!(ct.params.is_empty());
}

// --- TransferEncoding ---

#[test]
fn test_transfer_encoding_from_header() {
    assert_eq!(TransferEncoding::from_header("7bit"), TransferEncoding::SevenBit);
    assert_eq!(TransferEncoding::from_header("8BIT"), TransferEncoding::EightBit);
    assert_eq!(
        TransferEncoding::from_header(" Quoted-Printable "),
        TransferEncoding::QuotedPrintable
    );
    assert_eq!(TransferEncoding::from_header("base64"), TransferEncoding::Base64);
    assert_eq!(TransferEncoding::from_header("binary"), TransferEncoding::Binary);
    assert_eq!(TransferEncoding::from_header("x-uuencode"), TransferEncoding::SevenBit);
    assert_eq!(TransferEncoding::default(), TransferEncoding::SevenBit);
}

#[test]
fn test_transfer_encoding_display() {
    assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
    assert_eq!(TransferEncoding::SevenBit.to_string(), "7bit");
}

// --- Addresses ---

#[test]
fn test_mailbox_display() {
    let named = Mailbox {
        name: Some("Jane Roe".into()),
        address: "jane@example.com".into(),
    };
    let bare = Mailbox {
        name: None,
        address: "ops@example.com".into(),
    };

    assert_eq!(named.to_string(), "Jane Roe <jane@example.com>");
    assert_eq!(bare.to_string(), "ops@example.com");
}

#[test]
fn test_header_value_first_address() {
    let text = HeaderValue::Text("nobody".into());
    assert!(text.first_address().is_none());
    assert_eq!(text.to_string(), "nobody");
}

#[test]
fn test_header_set_group_addresses() {
    let message = parse(b"To: Team: a@example.com, b@example.com;\r\n\r\nx");
    let to = message.headers.addresses("to").unwrap();

    match to {
        HeaderValue::Addresses(list) => {
            let addresses: Vec<&str> = list.iter().map(|m| m.address.as_str()).collect();
            assert_eq!(addresses, vec!["a@example.com", "b@example.com"]);
        }
        HeaderValue::Text(value) => panic!("expected addresses, got {value:?}"),
    }
}

// --- HeaderSet ---

#[test]
fn test_header_set_get_all() {
    let message = parse(b"Received: one\r\nreceived: two\r\nSubject: s\r\n\r\nx");
    let received: Vec<&str> = message.headers.get_all("RECEIVED").collect();

    assert_eq!(received, vec!["one", "two"]);
    assert_eq!(message.headers.field("subject").unwrap().name, "Subject");
}

#[test]
fn test_header_set_absent() {
    let headers = HeaderSet::default();

    assert!(headers.get("from").is_none());
    assert!(headers.addresses("from").is_none());
    assert!(headers.subject().is_none());
    assert!(headers.date().is_none());
}

// --- MessageDate ---

#[test]
fn test_message_date_with_comment() {
    let date = MessageDate::parse("Wed, 01 Jan 2025 12:00:00 +0000 (UTC)");

    assert_eq!(date.raw, "Wed, 01 Jan 2025 12:00:00 +0000 (UTC)");
    assert_eq!(date.parsed.unwrap().timestamp(), 1_735_732_800);
}

#[test]
fn test_message_date_offset() {
    let date = MessageDate::parse("Wed, 01 Jan 2025 14:00:00 +0200");

    assert_eq!(date.parsed.unwrap().timestamp(), 1_735_732_800);
    assert_eq!(date.to_string(), "Wed, 01 Jan 2025 14:00:00 +0200");
}

// --- DecodedContent ---

#[test]
fn test_decoded_content_constructors() {
    assert!(DecodedContent::html("<p>x</p>").is_html());
    assert!(!DecodedContent::text("x").is_html());

    let placeholder = DecodedContent::placeholder();
    assert_eq!(placeholder.kind, BodyKind::Text);
    assert_eq!(placeholder.content, NO_READABLE_CONTENT);
    assert!(!placeholder.fallback);
}
