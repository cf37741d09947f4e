//! Document passes, in the order the orchestrator runs them
//!
//! Every pass takes the document text and returns a new one; none of them
//! parses HTML into a tree.

pub mod images;
pub mod inject;
pub mod lazy_load;
pub mod scripts;
pub mod srcset;
pub mod stylesheets;

pub use images::{rewrite_img_sources, rewrite_style_backgrounds};
pub use inject::{inject_metadata_comment, inject_scroll_fix, inject_watermark};
pub use lazy_load::normalize_lazy_loading;
pub use scripts::strip_scripts;
pub use srcset::{parse_srcset, rewrite_picture_sources, rewrite_srcset_entries};
pub use stylesheets::rewrite_stylesheets;
