//! Media type classification and inline data URLs
//!
//! A known file extension on the URL path beats whatever the server claimed;
//! CDNs routinely serve stylesheets and fonts as `text/plain` or
//! `application/octet-stream`.

use base64::Engine;

/// Fallback when neither the URL nor the response says anything useful
pub const DEFAULT_MIME: &str = "application/octet-stream";

const EXTENSION_TYPES: &[(&str, &str)] = &[
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".webp", "image/webp"),
    (".ico", "image/x-icon"),
    (".woff2", "font/woff2"),
    (".woff", "font/woff"),
    (".ttf", "font/ttf"),
    (".eot", "application/vnd.ms-fontobject"),
];

// Order matters: "woff2" must be tested before "woff"
const CONTENT_TYPE_HINTS: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("javascript", "application/javascript"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("woff2", "font/woff2"),
    ("woff", "font/woff"),
    ("ttf", "font/ttf"),
    ("eot", "application/vnd.ms-fontobject"),
];

/// Strip query string and fragment, lowercase what is left
fn url_path_lowercase(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_ascii_lowercase()
}

/// Resolve the media type of a fetched resource
///
/// Never fails: unknown inputs fall back to the content type verbatim and
/// then to [`DEFAULT_MIME`].
#[must_use]
pub fn resolve_mime(url: &str, content_type: &str) -> String {
    let path = url_path_lowercase(url);
    if let Some((_, mime)) = EXTENSION_TYPES.iter().find(|(ext, _)| path.ends_with(ext)) {
        return (*mime).to_string();
    }

    let content_type = content_type.trim();
    let lowered = content_type.to_ascii_lowercase();
    if let Some((_, mime)) = CONTENT_TYPE_HINTS
        .iter()
        .find(|(hint, _)| lowered.contains(hint))
    {
        return (*mime).to_string();
    }

    if content_type.is_empty() {
        DEFAULT_MIME.to_string()
    } else {
        content_type.to_string()
    }
}

/// Encode bytes as a `data:<mime>;base64,<payload>` URL
#[must_use]
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded_capacity = base64::encoded_len(bytes.len(), false).unwrap_or(0);
    let mut encoded = String::with_capacity(encoded_capacity + 14 + mime.len());

    encoded.push_str("data:");
    encoded.push_str(mime);
    encoded.push_str(";base64,");

    base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut encoded);
    encoded
}
