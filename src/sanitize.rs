//! Allow-list HTML sanitization
//!
//! Decoded HTML bodies pass through [`Sanitizer`] before they reach a
//! renderer. Only elements and attributes named in the [`SanitizePolicy`]
//! survive, forbidden elements are dropped with their content, event-handler
//! attributes never pass, and every URL-bearing attribute is rewritten by the
//! policy's URL function. Any fault inside the sanitizer yields empty output.

use crate::error::{MailError, Result};
use ammonia::UrlRelative;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;
use url::Url;

/// Value substituted for URLs that fail normalization
pub const PLACEHOLDER_URL: &str = "#";

/// Rewrites a URL attribute value given the permitted schemes
pub type UrlRewrite = fn(&str, &BTreeSet<String>) -> String;

// Matched against style values with whitespace, quotes and escapes removed
const STYLE_BLOCKLIST: [&str; 6] = [
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior:",
    "url(data:",
];

/// Data-driven sanitizer configuration
#[derive(Debug, Clone)]
pub struct SanitizePolicy {
    /// Elements kept in the output
    pub tags: BTreeSet<String>,

    /// Attributes kept on any allowed element
    pub attributes: BTreeSet<String>,

    /// Elements removed together with their content
    pub forbidden_tags: BTreeSet<String>,

    /// Schemes a normalized URL may use
    pub url_schemes: BTreeSet<String>,

    /// Attributes whose values go through `url_rewrite`
    pub url_attributes: BTreeSet<String>,

    pub url_rewrite: UrlRewrite,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            tags: set(&[
                "p", "br", "b", "strong", "i", "em", "u", "a", "ul", "ol", "li", "h1", "h2", "h3",
                "h4", "h5", "h6", "blockquote", "img", "span", "div", "table", "caption", "thead",
                "tbody", "tfoot", "tr", "th", "td", "colgroup", "col",
            ]),
            attributes: set(&["href", "src", "alt", "title", "style", "class"]),
            forbidden_tags: set(&["script", "style"]),
            url_schemes: set(&["http", "https", "mailto", "cid"]),
            url_attributes: set(&["href", "src"]),
            url_rewrite: normalize_url,
        }
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl SanitizePolicy {
    /// Reject policies that allow an element they also forbid
    pub fn validate(&self) -> Result<()> {
        let overlap: Vec<&str> = self
            .tags
            .intersection(&self.forbidden_tags)
            .map(String::as_str)
            .collect();

        if overlap.is_empty() {
            Ok(())
        } else {
            Err(MailError::Sanitize(format!(
                "elements both allowed and forbidden: {}",
                overlap.join(", ")
            )))
        }
    }
}

/// Parse `value` as an absolute URL with a permitted scheme and return its
/// normalized form, or [`PLACEHOLDER_URL`] when that fails.
#[must_use]
pub fn normalize_url(value: &str, schemes: &BTreeSet<String>) -> String {
    match Url::parse(value.trim()) {
        Ok(url) if schemes.contains(url.scheme()) => url.into(),
        _ => PLACEHOLDER_URL.to_string(),
    }
}

fn is_safe_style(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|&c| !c.is_whitespace() && !matches!(c, '\\' | '"' | '\''))
        .flat_map(char::to_lowercase)
        .collect();

    !STYLE_BLOCKLIST.iter().any(|token| compact.contains(token))
}

fn is_event_handler(attribute: &str) -> bool {
    attribute
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

/// HTML sanitizer bound to one policy
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: SanitizePolicy,
}

impl Sanitizer {
    /// Build a sanitizer. Event-handler attributes are removed from the
    /// policy whatever it lists.
    pub fn new(mut policy: SanitizePolicy) -> Result<Self> {
        policy.validate()?;

        let handlers: Vec<String> = policy
            .attributes
            .iter()
            .filter(|a| is_event_handler(a))
            .cloned()
            .collect();
        for handler in handlers {
            warn!("Dropping event handler attribute {handler:?} from sanitize policy");
            policy.attributes.remove(&handler);
        }

        Ok(Self { policy })
    }

    #[must_use]
    pub const fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Sanitize an HTML fragment. Output is empty if sanitization faults.
    #[must_use]
    pub fn sanitize(&self, html: &str) -> String {
        panic::catch_unwind(AssertUnwindSafe(|| self.clean(html))).unwrap_or_else(|_| {
            warn!("Sanitizer fault, discarding HTML content");
            String::new()
        })
    }

    fn clean(&self, html: &str) -> String {
        let policy = &self.policy;
        let tags: HashSet<&str> = policy.tags.iter().map(String::as_str).collect();
        let forbidden: HashSet<&str> = policy.forbidden_tags.iter().map(String::as_str).collect();
        let attributes: HashSet<&str> = policy
            .attributes
            .iter()
            .map(String::as_str)
            .filter(|a| !is_event_handler(a))
            .collect();
        let schemes: HashSet<&str> = policy.url_schemes.iter().map(String::as_str).collect();

        let url_attributes = policy.url_attributes.clone();
        let url_schemes = policy.url_schemes.clone();
        let rewrite = policy.url_rewrite;

        let mut builder = ammonia::Builder::default();
        builder
            .tags(tags)
            .clean_content_tags(forbidden)
            .tag_attributes(HashMap::new())
            .generic_attributes(attributes)
            .url_schemes(schemes)
            .url_relative(UrlRelative::PassThrough)
            .strip_comments(true)
            .attribute_filter(move |_element, attribute, value| {
                if url_attributes.contains(attribute) {
                    Some(Cow::Owned(rewrite(value, &url_schemes)))
                } else if attribute == "style" && !is_safe_style(value) {
                    None
                } else {
                    Some(Cow::Borrowed(value))
                }
            });

        builder.clean(html).to_string()
    }
}

static DEFAULT_SANITIZER: std::sync::LazyLock<Sanitizer> =
    std::sync::LazyLock::new(Sanitizer::default);

/// Sanitize with the default policy
#[must_use]
pub fn sanitize(html: &str) -> String {
    DEFAULT_SANITIZER.sanitize(html)
}
