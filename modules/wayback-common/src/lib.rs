pub mod canonical;
pub mod config;
pub mod error;
pub mod types;

pub use canonical::{canonicalize, normalize_domain, top_folder, url_path};
pub use config::Config;
pub use error::{ConfigError, Result};
pub use types::*;
