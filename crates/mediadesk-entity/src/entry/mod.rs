//! Directory and file entities.

pub mod directory;
pub mod file;
pub mod key;
pub mod meta;

pub use directory::Directory;
pub use file::{File, PendingPayload};
pub use key::{DropMode, EntryKey};
pub use meta::EntryMeta;
