pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{assets_folder_for, default_output_path, display_domain, is_data_url, resolve_url};
