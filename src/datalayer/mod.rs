mod bridge;
mod filter;
pub mod store;

pub use bridge::{Bridge, FilesystemBridge, WriteMode};
pub use filter::{CollectionFilter, FileFilter};
pub use store::ParsedContent;
