//! Script and inline event handler removal

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>").expect("SCRIPT_BLOCK: hardcoded regex is valid")
});

static HANDLER_DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on\w+="[^"]*""#).expect("HANDLER_DOUBLE_QUOTED: hardcoded regex is valid")
});

static HANDLER_SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+on\w+='[^']*'").expect("HANDLER_SINGLE_QUOTED: hardcoded regex is valid")
});

/// Remove `<script>` blocks and `on*` event handler attributes
///
/// A snapshot must not run page code: scripts would re-fetch resources,
/// re-insert consent banners, or rewrite the captured DOM.
#[must_use]
pub fn strip_scripts(html: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(html, "");
    let without_double = HANDLER_DOUBLE_QUOTED.replace_all(&without_blocks, "");
    HANDLER_SINGLE_QUOTED
        .replace_all(&without_double, "")
        .into_owned()
}
