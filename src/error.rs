//! Error type shared by every container in the crate.

use thiserror::Error;

/// Failures surfaced synchronously to the caller.
///
/// A missing key is never an error: lookups and removals report absence
/// through the no-entry sentinel or `Option::None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Initial capacity that would be negative when read as a signed word.
    #[error("invalid initial capacity {0}: must not exceed isize::MAX")]
    InvalidCapacity(usize),

    /// Load factor outside of `(0, 1]`.
    #[error("invalid load factor {0}: expected a value in (0, 1]")]
    InvalidLoadFactor(f32),

    /// Addition through a view that cannot build a complete entry.
    #[error("unsupported mutation: {0}")]
    UnsupportedMutation(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_argument() {
        assert_eq!(
            Error::InvalidLoadFactor(1.5).to_string(),
            "invalid load factor 1.5: expected a value in (0, 1]"
        );
        assert!(Error::InvalidCapacity(usize::MAX)
            .to_string()
            .contains(&usize::MAX.to_string()));
        assert_eq!(
            Error::UnsupportedMutation("KeySet::add").to_string(),
            "unsupported mutation: KeySet::add"
        );
    }
}
