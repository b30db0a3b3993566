pub mod interpolate;
pub mod scope;
pub mod snapshot;
pub mod store;
pub mod value;

pub use scope::*;
pub use store::*;
pub use value::*;
