//! Custom extractors.

pub mod caller;
pub mod key;

pub use caller::Caller;
pub use key::{parse_dir_id, parse_file_id, parse_key};
