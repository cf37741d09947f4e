//! End-to-end conversion tests over an in-memory fetcher

mod common;

use chrono::{DateTime, Local, TimeZone};
use common::{attribute_values, create_test_html, decode_data_url, MockFetcher, PNG_BYTES, SVG_BYTES};
use kodegen_tools_standalone::config::{AssetMode, StandaloneConfig};
use kodegen_tools_standalone::mime::resolve_mime;
use kodegen_tools_standalone::standalone::asset_store::asset_filename;
use kodegen_tools_standalone::standalone::passes::{
    inject_metadata_comment, inject_scroll_fix, normalize_lazy_loading,
};
use kodegen_tools_standalone::standalone::{create_standalone_html, create_standalone_html_at};
use kodegen_tools_standalone::ResourceCategory;
use std::time::Duration;
use tempfile::TempDir;

const BASE: &str = "https://ex.com";

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
}

fn embed_config() -> StandaloneConfig {
    StandaloneConfig::builder().build().unwrap()
}

fn download_config(dir: &TempDir) -> StandaloneConfig {
    StandaloneConfig::builder()
        .asset_mode(AssetMode::Download)
        .assets_folder(dir.path().join("page_assets"), "page_assets")
        .build()
        .unwrap()
}

#[tokio::test]
async fn embed_image_src_as_data_url() {
    let fetcher = MockFetcher::new().with("https://ex.com/a.png", PNG_BYTES, "image/png");
    let html = create_test_html("", r#"<img src="/a.png" alt="logo">"#);

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    let srcs = attribute_values(&result.html, "src");
    assert_eq!(srcs.len(), 1);
    assert!(srcs[0].starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&srcs[0]);
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, PNG_BYTES);
    assert!(result.html.contains(r#"alt="logo""#));

    assert_eq!(result.stats.images_inlined, 1);
    assert_eq!(result.stats.resources_failed, 0);
    assert_eq!(result.stats.source_url, BASE);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn download_image_src_to_asset_folder() {
    let dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new().with("https://ex.com/a.png", PNG_BYTES, "image/png");
    let html = create_test_html("", r#"<img src="/a.png"><img src="https://ex.com/a.png">"#);

    let result = create_standalone_html(&html, BASE, &download_config(&dir), &fetcher)
        .await
        .unwrap();

    let filename = asset_filename("https://ex.com/a.png");
    assert_eq!(filename.len(), 12 + ".png".len());
    let expected = format!("page_assets/images/{filename}");
    assert_eq!(attribute_values(&result.html, "src"), vec![expected.clone(), expected]);

    let on_disk = std::fs::read(dir.path().join("page_assets/images").join(&filename)).unwrap();
    assert_eq!(on_disk, PNG_BYTES);
    assert_eq!(result.stats.assets_downloaded, 2);
    assert_eq!(result.stats.images_inlined, 0);
}

#[tokio::test]
async fn stylesheet_inlined_with_its_css_urls() {
    let fetcher = MockFetcher::new()
        .with(
            "https://ex.com/css/style.css",
            b".icon { background: url(icon.svg) no-repeat; }",
            "text/css",
        )
        .with("https://ex.com/css/icon.svg", SVG_BYTES, "image/svg+xml");
    let html = create_test_html(r#"<link rel="stylesheet" href="css/style.css">"#, "<p>x</p>");

    let result = create_standalone_html(&html, "https://ex.com/", &embed_config(), &fetcher)
        .await
        .unwrap();

    assert!(!result.html.contains("<link"));
    assert!(result.html.contains("<style>/* Inlined: css/style.css */\n.icon { background: url(\"data:image/svg+xml;base64,"));
    assert_eq!(result.stats.stylesheets_inlined, 1);
    assert_eq!(result.stats.css_urls_inlined, 1);
    assert_eq!(fetcher.calls("https://ex.com/css/icon.svg"), 1);
}

#[tokio::test]
async fn download_mode_relocates_stylesheet_verbatim() {
    let dir = TempDir::new().unwrap();
    let css = b"body { background: url(bg.png); }";
    let fetcher = MockFetcher::new().with("https://ex.com/style.css", css, "text/css");
    let html = create_test_html(r#"<link href="/style.css" rel="stylesheet" media="all">"#, "");

    let result = create_standalone_html(&html, BASE, &download_config(&dir), &fetcher)
        .await
        .unwrap();

    let filename = asset_filename("https://ex.com/style.css");
    assert!(result
        .html
        .contains(&format!(r#"<link rel="stylesheet" href="page_assets/css/{filename}">"#)));
    let on_disk = std::fs::read(dir.path().join("page_assets/css").join(&filename)).unwrap();
    assert_eq!(on_disk, css);
    // url(...) inside relocated stylesheets is not followed
    assert_eq!(fetcher.calls("https://ex.com/bg.png"), 0);
    assert_eq!(result.stats.assets_downloaded, 1);
}

#[tokio::test]
async fn scripts_and_handlers_removed() {
    let fetcher = MockFetcher::new();
    let html = create_test_html(
        "<script>alert(1)</script>",
        "<div onclick=\"x()\">hi</div><script type=\"text/javascript\">\nvar a = 1;\n</script>",
    );

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    assert!(!result.html.contains("<script"));
    assert!(!result.html.contains(" onclick="));
    assert!(result.html.contains("<div>hi</div>"));
}

#[tokio::test]
async fn scripts_kept_when_configured() {
    let fetcher = MockFetcher::new();
    let config = StandaloneConfig::builder().remove_scripts(false).build().unwrap();
    let html = create_test_html("<script>alert(1)</script>", "");

    let result = create_standalone_html(&html, BASE, &config, &fetcher).await.unwrap();
    assert!(result.html.contains("<script>alert(1)</script>"));
}

#[tokio::test]
async fn hotlink_mode_only_adds_structural_changes() {
    let fetcher = MockFetcher::new().with("https://ex.com/a.png", PNG_BYTES, "image/png");
    let config = StandaloneConfig::builder()
        .asset_mode(AssetMode::Hotlink)
        .build()
        .unwrap();
    let html = create_test_html(
        r#"<link rel="stylesheet" href="/style.css">"#,
        r#"<img src="/a.png" srcset="/a.png 1x, /a@2x.png 2x" data-src="/lazy.png"><div style="background: url('/bg.png')"></div><picture><source srcset="/b.webp"></picture>"#,
    );

    let result = create_standalone_html_at(&html, BASE, &config, &fetcher, fixed_time())
        .await
        .unwrap();

    let expected = inject_metadata_comment(
        &inject_scroll_fix(&normalize_lazy_loading(&html)),
        "Preview",
        BASE,
        fixed_time(),
    );
    assert_eq!(result.html, expected);
    assert_eq!(fetcher.total_calls(), 0);
    assert_eq!(result.stats.fetches, 0);
}

#[tokio::test]
async fn embed_output_needs_no_further_fetches() {
    let fetcher = MockFetcher::new()
        .with("https://ex.com/style.css", b"h1 { background: url('/h.png'); }", "text/css")
        .with("https://ex.com/h.png", PNG_BYTES, "image/png")
        .with("https://ex.com/a.png", PNG_BYTES, "image/png")
        .with("https://ex.com/a-2x.png", PNG_BYTES, "image/png")
        .with("https://ex.com/bg.jpg", PNG_BYTES, "image/jpeg")
        .with("https://ex.com/b.webp", PNG_BYTES, "image/webp");
    let html = create_test_html(
        r#"<link rel="stylesheet" href="/style.css">"#,
        r#"<img src="/a.png" srcset="/a.png 1x, /a-2x.png 2x"><div style="background-image: url(/bg.jpg)"></div><picture><source srcset="/b.webp 800w"><img src="/a.png"></picture>"#,
    );

    let first = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();
    assert_eq!(first.stats.resources_failed, 0, "{:?}", first.errors);
    assert!(first.stats.fetches > 0);

    let second_fetcher = MockFetcher::new();
    let second = create_standalone_html(&first.html, BASE, &embed_config(), &second_fetcher)
        .await
        .unwrap();
    assert_eq!(second_fetcher.total_calls(), 0);
    assert_eq!(second.stats.fetches, 0);
    assert_eq!(second.stats.resources_failed, 0);
}

#[tokio::test]
async fn embedded_media_type_follows_mime_resolution() {
    // Server mislabels the image; the extension wins
    let fetcher = MockFetcher::new().with("https://ex.com/photo.jpg?v=3", PNG_BYTES, "text/plain");
    let html = create_test_html("", r#"<img src="/photo.jpg?v=3">"#);

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    let (mime, bytes) = decode_data_url(&attribute_values(&result.html, "src")[0]);
    assert_eq!(mime, resolve_mime("https://ex.com/photo.jpg?v=3", "text/plain"));
    assert_eq!(mime, "image/jpeg");
    assert_eq!(bytes, PNG_BYTES);
}

#[tokio::test]
async fn failed_fetch_keeps_reference_and_counts_once() {
    let fetcher = MockFetcher::new()
        .with_status("https://ex.com/missing.png", 404)
        .with("https://ex.com/ok.png", PNG_BYTES, "image/png");
    let html = create_test_html("", r#"<img src="/missing.png" class="a"><img src="/ok.png">"#);
    let config = StandaloneConfig::builder().cache_resources(false).build().unwrap();

    let result = create_standalone_html(&html, BASE, &config, &fetcher).await.unwrap();

    assert!(result.html.contains(r#"<img src="/missing.png" class="a">"#));
    assert_eq!(result.stats.resources_failed, 1);
    assert_eq!(result.stats.images_inlined, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].url, "https://ex.com/missing.png");
    assert_eq!(result.errors[0].category, ResourceCategory::ImageSrc);
    assert!(result.errors[0].reason.contains("404"));
}

#[tokio::test]
async fn failed_stylesheet_keeps_link() {
    let fetcher = MockFetcher::new().with_status("https://ex.com/gone.css", 500);
    let link = r#"<link rel="stylesheet" href="/gone.css">"#;
    let html = create_test_html(link, "");

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    assert!(result.html.contains(link));
    assert_eq!(result.stats.resources_failed, 1);
    assert_eq!(result.stats.stylesheets_inlined, 0);
    assert_eq!(result.errors[0].category, ResourceCategory::StylesheetLink);
}

#[tokio::test]
async fn srcset_candidates_keep_descriptors_and_failures() {
    let fetcher = MockFetcher::new().with("https://ex.com/small.png", PNG_BYTES, "image/png");
    let html = create_test_html(
        "",
        r#"<img src="data:image/gif;base64,R0lGOD" srcset="/small.png 480w,  /broken.png 1080w">"#,
    );

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    let srcset = &attribute_values(&result.html, "srcset")[0];
    let (first, second) = srcset.split_once(",  ").unwrap();
    assert!(first.starts_with("data:image/png;base64,"));
    assert!(first.ends_with(" 480w"));
    assert_eq!(second, "/broken.png 1080w");
    assert_eq!(result.stats.images_inlined, 1);
    assert_eq!(result.stats.resources_failed, 1);
    assert_eq!(result.errors[0].category, ResourceCategory::SrcsetEntry);
}

#[tokio::test]
async fn picture_sources_handled_once() {
    let fetcher = MockFetcher::new()
        .with("https://ex.com/hero.webp", PNG_BYTES, "image/webp")
        .with("https://ex.com/hero-2x.webp", PNG_BYTES, "image/webp");
    let config = StandaloneConfig::builder().cache_resources(false).build().unwrap();
    let html = create_test_html(
        "",
        r#"<picture><source type="image/webp" srcset="/hero.webp 1x, /hero-2x.webp 2x"></picture>"#,
    );

    let result = create_standalone_html(&html, BASE, &config, &fetcher).await.unwrap();

    let srcset = &attribute_values(&result.html, "srcset")[0];
    assert_eq!(srcset.matches("data:image/webp;base64,").count(), 2);
    assert!(srcset.ends_with(" 2x"));
    assert!(result.html.contains(r#"<source type="image/webp" srcset=""#));
    assert_eq!(fetcher.calls("https://ex.com/hero.webp"), 1);
    assert_eq!(fetcher.calls("https://ex.com/hero-2x.webp"), 1);
    assert_eq!(result.stats.images_inlined, 2);
}

#[tokio::test]
async fn lazy_images_are_fetched() {
    let fetcher = MockFetcher::new().with("https://ex.com/real.png", PNG_BYTES, "image/png");
    let html = create_test_html(
        "",
        r#"<img src="data:image/gif;base64,R0lGOD" data-src="/real.png" loading="lazy">"#,
    );

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    assert_eq!(fetcher.calls("https://ex.com/real.png"), 1);
    assert!(!result.html.contains("loading="));
    assert!(!result.html.contains("data-src"));
    assert_eq!(result.stats.images_inlined, 1);
}

#[tokio::test]
async fn style_background_first_url_only() {
    let fetcher = MockFetcher::new()
        .with("https://ex.com/one.png", PNG_BYTES, "image/png")
        .with("https://ex.com/two.png", PNG_BYTES, "image/png");
    let html = create_test_html(
        "",
        r#"<div style="background: url('/one.png'), url('/two.png')"></div>"#,
    );

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher)
        .await
        .unwrap();

    assert!(result.html.contains("url('data:image/png;base64,"));
    assert!(result.html.contains("url('/two.png')"));
    assert_eq!(fetcher.calls("https://ex.com/two.png"), 0);
}

#[tokio::test]
async fn resolution_cache_deduplicates_fetches() {
    let html = create_test_html(
        "",
        r#"<img src="/a.png"><img src="/a.png"><div style="background:url(/a.png)"></div>"#,
    );

    let cached = MockFetcher::new().with("https://ex.com/a.png", PNG_BYTES, "image/png");
    let result = create_standalone_html(&html, BASE, &embed_config(), &cached)
        .await
        .unwrap();
    assert_eq!(cached.calls("https://ex.com/a.png"), 1);
    assert_eq!(result.stats.fetches, 1);
    assert_eq!(result.stats.images_inlined, 3);

    let uncached = MockFetcher::new().with("https://ex.com/a.png", PNG_BYTES, "image/png");
    let config = StandaloneConfig::builder().cache_resources(false).build().unwrap();
    let result = create_standalone_html(&html, BASE, &config, &uncached).await.unwrap();
    assert_eq!(uncached.calls("https://ex.com/a.png"), 3);
    assert_eq!(result.stats.fetches, 3);
    assert_eq!(result.stats.images_inlined, 3);
}

#[tokio::test]
async fn many_stylesheets_with_single_worker() {
    let mut fetcher = MockFetcher::new();
    let mut links = String::new();
    for i in 0..6 {
        let url = format!("https://ex.com/s{i}.css");
        fetcher = fetcher.with(&url, format!(".c{i} {{ color: red; }}").as_bytes(), "text/css");
        links.push_str(&format!(r#"<link rel="stylesheet" href="/s{i}.css">"#));
    }
    let config = StandaloneConfig::builder().max_workers(1).build().unwrap();
    let html = create_test_html(&links, "");

    let result = create_standalone_html(&html, BASE, &config, &fetcher).await.unwrap();

    assert_eq!(result.stats.stylesheets_inlined, 6);
    assert!(!result.html.contains("<link"));
    for i in 0..6 {
        assert!(result.html.contains(&format!(".c{i} {{ color: red; }}")));
    }
}

#[tokio::test]
async fn structural_injections_in_order() {
    let fetcher = MockFetcher::new();
    let config = StandaloneConfig::builder()
        .include_watermark(true)
        .project_name("Acme Relaunch")
        .build()
        .unwrap();
    let html = create_test_html("<title>t</title>", "<p>x</p>");

    let result = create_standalone_html_at(&html, "https://www.acme.com/shop", &config, &fetcher, fixed_time())
        .await
        .unwrap();

    assert!(result.html.starts_with("<!DOCTYPE html>\n<!--\n"));
    assert!(result.html.contains("Project:  Acme Relaunch"));
    assert!(result.html.contains("Source:   www.acme.com"));
    let fix = result.html.find("standalone-scroll-fix").unwrap();
    let head_close = result.html.find("</head>").unwrap();
    assert!(fix < head_close);
    let body = result.html.find("<body>").unwrap();
    let banner = result.html.find("preview-watermark").unwrap();
    assert!(banner > body);
    assert!(result.html.contains("Created: 01.06.2025 12:30 | Acme Relaunch"));
    assert_eq!(result.stats.total_size_before, html.len());
    assert_eq!(result.stats.total_size_after, result.html.len());
}

#[tokio::test]
async fn stylesheets_finishing_out_of_order_replace_their_own_links() {
    let fetcher = MockFetcher::new()
        .with("https://ex.com/theme/a.css", b"THEME{}", "text/css")
        .with("https://ex.com/a.css", b"ROOT{}", "text/css")
        .with_delay("https://ex.com/theme/a.css", Duration::from_millis(200));
    let html = create_test_html(
        r#"<link rel="stylesheet" href="/theme/a.css"><link rel="stylesheet" href="/a.css">"#,
        "",
    );

    let result = create_standalone_html(&html, BASE, &embed_config(), &fetcher).await.unwrap();

    assert_eq!(result.stats.stylesheets_inlined, 2);
    assert_eq!(result.stats.resources_failed, 0);
    assert!(result.errors.is_empty());
    assert!(!result.html.contains("<link"));
    let theme = result.html.find("/* Inlined: /theme/a.css */\nTHEME{}").unwrap();
    let root = result.html.find("/* Inlined: /a.css */\nROOT{}").unwrap();
    assert!(theme < root);
}
