use crate::error::Result;

/// Validate structural preconditions that construction does not enforce.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
