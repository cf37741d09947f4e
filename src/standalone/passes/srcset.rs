//! Responsive image candidate lists: `srcset` outside and inside `<source>`
//!
//! Only the URL part of each candidate is rewritten. Separators and
//! descriptors keep their original bytes, so an attribute whose candidates
//! all fail (or are already inline) comes out unchanged.

use fancy_regex::Regex as FancyRegex;
use std::ops::Range;
use std::sync::LazyLock;

use super::super::collector::StatsCollector;
use super::super::strategy::ReferenceResolver;
use super::super::types::{ResourceCategory, ResourceReference};
use crate::fetch::Fetcher;

/// `srcset` on any element except `<source>`, which has its own pass
static SRCSET_OUTSIDE_SOURCE: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r#"(?i)<(?!source\b)[a-z][^>]*?\ssrcset=(["'])([^"']+)\1"#)
        .expect("SRCSET_OUTSIDE_SOURCE: hardcoded regex is valid")
});

static SOURCE_SRCSET: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r#"(?i)(<source[^>]+srcset=)(["'])([^"']+)(\2[^>]*>)"#)
        .expect("SOURCE_SRCSET: hardcoded regex is valid")
});

/// One image candidate of a `srcset` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate {
    /// Byte range of the URL within the attribute value
    pub url: Range<usize>,
    /// Everything up to the next top-level comma, trimmed
    pub descriptor: Option<String>,
}

/// Split a `srcset` value into candidates
///
/// The URL is the run of non-whitespace characters (trailing commas
/// excluded), so commas inside `data:` URLs survive. The descriptor runs to
/// the next comma outside parentheses and is kept verbatim, including
/// multi-token or malformed descriptors.
#[must_use]
pub fn parse_srcset(value: &str) -> Vec<SrcsetCandidate> {
    let bytes = value.as_bytes();
    let mut candidates = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let url_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut url_end = pos;
        while url_end > url_start && bytes[url_end - 1] == b',' {
            url_end -= 1;
        }
        if url_end == url_start {
            continue;
        }

        // A trailing comma on the URL ends the candidate without a descriptor
        if url_end < pos {
            candidates.push(SrcsetCandidate {
                url: url_start..url_end,
                descriptor: None,
            });
            continue;
        }

        let descriptor_start = pos;
        let mut depth = 0usize;
        while pos < bytes.len() {
            match bytes[pos] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => break,
                _ => {}
            }
            pos += 1;
        }
        let descriptor = value[descriptor_start..pos].trim();

        candidates.push(SrcsetCandidate {
            url: url_start..url_end,
            descriptor: (!descriptor.is_empty()).then(|| descriptor.to_string()),
        });
    }

    candidates
}

/// Turn candidates of a value found at `value_offset` into document references
fn candidate_references(
    value: &str,
    value_offset: usize,
    category: ResourceCategory,
) -> impl Iterator<Item = ResourceReference> + '_ {
    parse_srcset(value).into_iter().map(move |candidate| {
        let span = value_offset + candidate.url.start..value_offset + candidate.url.end;
        ResourceReference::new(category, &value[candidate.url], span)
            .with_descriptor(candidate.descriptor)
    })
}

/// Candidates of every `srcset` attribute outside `<source>` elements
#[must_use]
pub fn collect_srcset_entries(html: &str) -> Vec<ResourceReference> {
    let mut references = Vec::new();
    for caps in SRCSET_OUTSIDE_SOURCE.captures_iter(html) {
        let caps = match caps {
            Ok(caps) => caps,
            Err(e) => {
                log::debug!("Skipping srcset match: {e}");
                continue;
            }
        };
        if let Some(value) = caps.get(2) {
            references.extend(candidate_references(
                value.as_str(),
                value.start(),
                ResourceCategory::SrcsetEntry,
            ));
        }
    }
    references
}

/// Candidates of every `<source srcset>` attribute
#[must_use]
pub fn collect_picture_sources(html: &str) -> Vec<ResourceReference> {
    let mut references = Vec::new();
    for caps in SOURCE_SRCSET.captures_iter(html) {
        let caps = match caps {
            Ok(caps) => caps,
            Err(e) => {
                log::debug!("Skipping <source> match: {e}");
                continue;
            }
        };
        if let Some(value) = caps.get(3) {
            references.extend(candidate_references(
                value.as_str(),
                value.start(),
                ResourceCategory::PictureSource,
            ));
        }
    }
    references
}

pub async fn rewrite_srcset_entries<F: Fetcher + ?Sized>(
    html: &str,
    resolver: &ReferenceResolver<'_, F>,
    collector: &mut StatsCollector,
) -> String {
    let references = collect_srcset_entries(html);
    log::info!("Processing {} srcset candidates", references.len());
    resolver.rewrite_references(html, references, collector).await
}

pub async fn rewrite_picture_sources<F: Fetcher + ?Sized>(
    html: &str,
    resolver: &ReferenceResolver<'_, F>,
    collector: &mut StatsCollector,
) -> String {
    let references = collect_picture_sources(html);
    log::info!("Processing {} <source> candidates", references.len());
    resolver.rewrite_references(html, references, collector).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls<'a>(value: &'a str, candidates: &[SrcsetCandidate]) -> Vec<&'a str> {
        candidates.iter().map(|c| &value[c.url.clone()]).collect()
    }

    #[test]
    fn parses_width_and_density_descriptors() {
        let value = "a.png 1x, b.png 2x,c.png 640w";
        let candidates = parse_srcset(value);
        assert_eq!(urls(value, &candidates), vec!["a.png", "b.png", "c.png"]);
        assert_eq!(candidates[1].descriptor.as_deref(), Some("2x"));
        assert_eq!(candidates[2].descriptor.as_deref(), Some("640w"));
    }

    #[test]
    fn data_url_commas_do_not_split_candidates() {
        let value = "data:image/png;base64,iVBORw0= 1x, /b.png 2x";
        let candidates = parse_srcset(value);
        assert_eq!(urls(value, &candidates), vec!["data:image/png;base64,iVBORw0=", "/b.png"]);
    }

    #[test]
    fn missing_and_multi_token_descriptors() {
        let value = "/a.png, /b.png 100w 2x , /c.png, /d.png";
        let candidates = parse_srcset(value);
        assert_eq!(urls(value, &candidates), vec!["/a.png", "/b.png", "/c.png", "/d.png"]);
        assert_eq!(candidates[0].descriptor, None);
        assert_eq!(candidates[1].descriptor.as_deref(), Some("100w 2x"));
        assert_eq!(candidates[3].descriptor, None);
    }

    #[test]
    fn commas_without_whitespace_stay_in_the_url() {
        let value = "/c.png,/d.png 2x";
        let candidates = parse_srcset(value);
        assert_eq!(urls(value, &candidates), vec!["/c.png,/d.png"]);
    }

    #[test]
    fn empty_value_has_no_candidates() {
        assert!(parse_srcset(" , ").is_empty());
    }

    #[test]
    fn srcset_pass_skips_source_elements() {
        let html = r#"<picture><source srcset="/s.webp 1x"><img src="/i.png" srcset="/i.png 1x, /i2.png 2x"></picture>"#;

        let entries = collect_srcset_entries(html);
        let raw: Vec<_> = entries.iter().map(|r| r.raw_url.as_str()).collect();
        assert_eq!(raw, vec!["/i.png", "/i2.png"]);
        assert_eq!(&html[entries[1].span.clone()], "/i2.png");
        assert_eq!(entries[1].descriptor.as_deref(), Some("2x"));

        let sources = collect_picture_sources(html);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].raw_url, "/s.webp");
        assert_eq!(sources[0].category, ResourceCategory::PictureSource);
        assert_eq!(&html[sources[0].span.clone()], "/s.webp");
    }
}
