pub mod config;
pub mod document;
pub mod error;
pub mod path;

pub use config::Config;
pub use document::JsonView;
pub use error::*;
pub use path::{read_path, JsonPath};
