use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

pub type AxonResult<T> = Result<T, AxonError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    MissingKey,
    InvalidValue,
    UnknownSection,
    InvalidConfig,
    InvalidGene,
    InvalidCrossover,
    UnknownMethod,
    NotActivated,
    ArityMismatch,
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

#[derive(Debug)]
pub enum AxonError {
    /// A required key was absent from its config section.
    MissingKey {
        message: ErrString,
    },
    /// A config value failed type coercion.
    InvalidValue {
        message: ErrString,
    },
    /// A required config section was absent.
    UnknownSection {
        message: ErrString,
    },
    InvalidConfig {
        message: ErrString,
    },
    /// A gene was constructed without its required attributes.
    InvalidGene {
        message: ErrString,
    },
    /// Crossover was attempted between genes with different structural keys.
    InvalidCrossover {
        message: ErrString,
    },
    /// An activation or aggregation name is not registered.
    UnknownMethod {
        message: ErrString,
    },
    /// `forward` was called before `activate`.
    NotActivated {
        message: ErrString,
    },
    /// The input vector length does not match the genome's input arity.
    ArityMismatch {
        message: ErrString,
    },
    Io {
        source: std::io::Error,
    },
}

impl AxonError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingKey { .. } => ErrorCode::MissingKey,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
            Self::UnknownSection { .. } => ErrorCode::UnknownSection,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::InvalidGene { .. } => ErrorCode::InvalidGene,
            Self::InvalidCrossover { .. } => ErrorCode::InvalidCrossover,
            Self::UnknownMethod { .. } => ErrorCode::UnknownMethod,
            Self::NotActivated { .. } => ErrorCode::NotActivated,
            Self::ArityMismatch { .. } => ErrorCode::ArityMismatch,
            Self::Io { .. } => ErrorCode::Io,
        }
    }
}

impl Display for AxonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey { message } => write!(f, "Missing key: {}", message),
            Self::InvalidValue { message } => write!(f, "Invalid value: {}", message),
            Self::UnknownSection { message } => write!(f, "Unknown section: {}", message),
            Self::InvalidConfig { message } => write!(f, "Invalid configuration: {}", message),
            Self::InvalidGene { message } => write!(f, "Invalid gene: {}", message),
            Self::InvalidCrossover { message } => write!(f, "Invalid crossover: {}", message),
            Self::UnknownMethod { message } => write!(f, "Unknown method: {}", message),
            Self::NotActivated { message } => write!(f, "Not activated: {}", message),
            Self::ArityMismatch { message } => write!(f, "Arity mismatch: {}", message),
            Self::Io { source } => write!(f, "Io error: {}", source),
        }
    }
}

impl std::error::Error for AxonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AxonError {
    fn from(source: std::io::Error) -> Self {
        AxonError::Io { source }
    }
}

#[doc(hidden)]
pub mod __private {
    #[inline]
    #[cold]
    #[must_use]
    pub fn must_use<E>(e: E) -> E {
        e
    }
}

#[macro_export]
macro_rules! axon_err {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::AxonError::$variant { message: format!($fmt, $($arg),*).into() })
    };
    ($variant:ident: $msg:expr $(,)?) => {
        $crate::__private::must_use($crate::AxonError::$variant { message: $msg.into() })
    };
}

#[macro_export]
macro_rules! axon_bail {
    ($($tt:tt)+) => { return Err($crate::axon_err!($($tt)+)) };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond { $crate::axon_bail!($($tt)+); }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        let err = axon_err!(MissingKey: "pop_size");
        assert_eq!(err.code(), ErrorCode::MissingKey);

        let err = axon_err!(UnknownMethod: "no activation named '{}'", "swish");
        assert_eq!(err.code(), ErrorCode::UnknownMethod);
        assert_eq!(err.to_string(), "Unknown method: no activation named 'swish'");
    }

    #[test]
    fn ensure_bails() {
        fn check(n: usize) -> AxonResult<usize> {
            ensure!(n > 0, ArityMismatch: "expected at least one input, got {}", n);
            Ok(n)
        }

        assert!(check(1).is_ok());
        assert_eq!(check(0).unwrap_err().code(), ErrorCode::ArityMismatch);
    }
}
