pub mod compute;
pub mod filters;
pub mod sets;

pub use compute::{compute_extension_filters, ExtensionMode, ExtensionSettings};
pub use filters::{
    build_extension_filters, parse_categories, parse_extensions, ExtensionGroups,
    DEFAULT_EXTENSION_CATEGORIES,
};
pub use sets::{subset_extensions, Category, ALL_CATEGORIES};
