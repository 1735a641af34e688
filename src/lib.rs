pub mod context;
pub mod copy;
pub mod decode;
pub mod errors;
pub mod extensions;
pub mod file_list;
pub mod ignore;
pub mod listing;
pub mod logger;
pub mod paths;
pub mod remote;
pub mod reporting;
pub mod settings;
pub mod template;
pub mod trie;
pub mod utils;
pub mod wsl;

pub use copy::{concatenate_files, BasicClipboardCopier, ClipboardCopier, ClipboardCopierConfig};
pub use errors::ClipError;
pub use ignore::IgnoreFilter;
