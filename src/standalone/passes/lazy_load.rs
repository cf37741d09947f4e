//! Lazy-loading attribute normalization
//!
//! Lazy-loading libraries keep the real image URL in a `data-*` attribute
//! and swap it in from script. Scripts are gone in the snapshot, so the URL
//! is promoted to the attribute the browser reads.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const LAZY_SRC_ATTRIBUTES: [&str; 4] = ["data-src", "data-lazy-src", "data-original", "data-lazy"];

/// First lazy source attribute of an `<img>`, group 2 is its value
static LAZY_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)(<img[^>]*?)\s+(?:{})=["']([^"']+)["']([^>]*>)"#,
        LAZY_SRC_ATTRIBUTES.join("|")
    ))
    .expect("LAZY_SRC: hardcoded regex is valid")
});

/// Placeholder `src` on either side of the promoted attribute
static PLACEHOLDER_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+src=["'][^"']*["']"#).expect("PLACEHOLDER_SRC: hardcoded regex is valid")
});

static LAZY_SRCSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<(?:img|source)[^>]*?)\s+data-srcset=["']([^"']+)["']"#)
        .expect("LAZY_SRCSET: hardcoded regex is valid")
});

static LOADING_LAZY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+loading=["']lazy["']"#).expect("LOADING_LAZY: hardcoded regex is valid")
});

/// Promote `data-src`-style attributes to `src`/`srcset` and drop `loading="lazy"`
#[must_use]
pub fn normalize_lazy_loading(html: &str) -> String {
    let mut html = html.to_string();

    html = LAZY_SRC
        .replace_all(&html, |caps: &Captures| {
            let before = PLACEHOLDER_SRC.replace_all(&caps[1], "");
            let after = PLACEHOLDER_SRC.replace_all(&caps[3], "");
            format!("{before} src=\"{}\"{after}", &caps[2])
        })
        .into_owned();

    html = LAZY_SRCSET
        .replace_all(&html, |caps: &Captures| format!("{} srcset=\"{}\"", &caps[1], &caps[2]))
        .into_owned();

    LOADING_LAZY.replace_all(&html, "").into_owned()
}
