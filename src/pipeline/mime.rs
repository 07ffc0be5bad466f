//! Extracts html and plain-text bodies from the nested MIME part tree
//! of a Gmail message.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::OnceLock;

use crate::google::gmail::MessagePart;

// Gmail strips padding from some payloads, so accept either form.
const BASE64_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBody {
    pub html: String,
    pub text: String,
}

/// Decode base64url content, translating the URL-safe alphabet to the
/// standard one first. A payload that fails to decode is returned
/// unchanged rather than failing the whole message.
fn decode_base64url(data: &str) -> String {
    let standard = data.replace('-', "+").replace('_', "/");
    BASE64_INDIFFERENT
        .decode(&standard)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| data.to_string())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn strip_tags(html: &str) -> String {
    tag_re().replace_all(html, "").to_string()
}

fn newlines_to_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}

fn part_data(part: &MessagePart) -> Option<&str> {
    let body = part.body.as_ref()?;
    // Attachments carry an attachmentId instead of inline data
    if body.attachment_id.is_some() {
        return None;
    }
    body.data.as_deref().filter(|data| !data.is_empty())
}

/// Walk the part tree and return both body channels.
///
/// Traversal is preorder with an explicit worklist (parent first,
/// then children in order) so deeply nested trees can't blow the
/// stack. The first `text/html` and first `text/plain` part seen win.
/// When only one channel exists the other is synthesized from it, and
/// a top-level part carrying data directly is used as a last resort.
pub fn decode_body(payload: Option<&MessagePart>) -> DecodedBody {
    let Some(payload) = payload else {
        return DecodedBody::default();
    };

    let mut html = String::new();
    let mut text = String::new();

    let mut worklist: Vec<&MessagePart> = vec![payload];
    while let Some(part) = worklist.pop() {
        match (part.mimetype.as_deref(), part_data(part)) {
            (Some("text/html"), Some(data)) if html.is_empty() => {
                html = decode_base64url(data);
            }
            (Some("text/plain"), Some(data)) if text.is_empty() => {
                text = decode_base64url(data);
            }
            _ => {}
        }
        if let Some(parts) = &part.parts {
            // Reverse so children pop in their original order
            for child in parts.iter().rev() {
                worklist.push(child);
            }
        }
    }

    if html.is_empty() && !text.is_empty() {
        html = newlines_to_breaks(&text);
    }
    if text.is_empty() && !html.is_empty() {
        text = strip_tags(&html);
    }

    // A top-level part with inline data and a mime type nothing above
    // matched (e.g. a bare message with no parts)
    if html.is_empty()
        && text.is_empty()
        && let Some(data) = part_data(payload)
    {
        let content = decode_base64url(data);
        if payload.mimetype.as_deref() == Some("text/html") {
            text = strip_tags(&content);
            html = content;
        } else {
            html = newlines_to_breaks(&content);
            text = content;
        }
    }

    DecodedBody { html, text }
}
