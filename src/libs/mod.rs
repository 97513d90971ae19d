pub mod data;
pub mod error;
pub mod labels;
pub mod severity;
pub mod version;
