pub mod conversion;
pub mod definition;
pub mod document;

pub use conversion::*;
pub use definition::*;
pub use document::*;
