//! Configuration and resolution errors.

use std::fmt::{self, Display, Formatter};

use ecow::{EcoString, eco_format};

/// Early-return with a [`StrResult`].
///
/// ```ignore
/// bail!("indent unit must be positive, found {}", unit);
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! __bail {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        return Err(::ecow::eco_format!($fmt $(, $arg)*).into())
    };

    ($error:expr) => {
        return Err($error.into())
    };
}

#[doc(inline)]
pub use crate::__bail as bail;

/// A result type with a string error message.
pub type StrResult<T> = Result<T, EcoString>;

/// A result type with a mode-related error.
pub type ModeResult<T> = Result<T, ModeError>;

/// An error that occurred while constructing or resolving a mode.
///
/// These are only ever raised before tokenization starts. Tokenizing and
/// indenting never fail.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ModeError {
    /// No mode is registered for the content type.
    UnknownContentType(EcoString),
    /// A configuration option has an unusable value.
    InvalidOption {
        /// The option's name as it appears in a configuration file.
        option: &'static str,
        /// Why the value was rejected.
        reason: EcoString,
    },
    /// A mode cannot be embedded in elements with this tag name.
    InvalidEmbed(EcoString),
}

impl std::error::Error for ModeError {}

impl Display for ModeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnknownContentType(name) => {
                write!(f, "unknown content type: {name}")
            }
            Self::InvalidOption { option, reason } => {
                write!(f, "invalid value for `{option}` ({reason})")
            }
            Self::InvalidEmbed(tag) => {
                write!(f, "cannot embed a mode in elements named {tag:?}")
            }
        }
    }
}

impl From<ModeError> for EcoString {
    fn from(err: ModeError) -> Self {
        eco_format!("{err}")
    }
}
