//! File browser listing and lazy tree.

pub mod service;

pub use service::{BrowserListing, BrowserService, ListedEntry, TreeNode};
