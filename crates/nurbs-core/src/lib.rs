pub mod error;
pub mod traits;

pub use error::{NurbsError, Result};
pub use traits::Validate;
