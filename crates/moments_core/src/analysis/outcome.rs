//! Explicit primary/fallback result variant.
//!
//! Degenerate numerical inputs are absorbed by documented fallbacks instead of
//! errors. `Outcome` keeps the fallback observable: callers always get a usable
//! value, and can inspect which path produced it.

/// Value produced either by the primary algorithm or by its fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, C> {
    /// The primary algorithm succeeded.
    Primary(T),
    /// The primary algorithm failed with `cause`; `value` came from the fallback.
    Fallback { value: T, cause: C },
}

impl<T, C> Outcome<T, C> {
    /// Borrows the produced value regardless of path.
    pub fn value(&self) -> &T {
        match self {
            Self::Primary(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Consumes the outcome and returns the produced value.
    pub fn into_value(self) -> T {
        match self {
            Self::Primary(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Returns the fallback cause, `None` on the primary path.
    pub fn cause(&self) -> Option<&C> {
        match self {
            Self::Primary(_) => None,
            Self::Fallback { cause, .. } => Some(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome;

    #[test]
    fn accessors_expose_value_and_path() {
        let primary: Outcome<u8, &str> = Outcome::Primary(1);
        assert!(!primary.is_fallback());
        assert_eq!(primary.cause(), None);
        assert_eq!(*primary.value(), 1);

        let fallback: Outcome<u8, &str> = Outcome::Fallback {
            value: 2,
            cause: "empty",
        };
        assert!(fallback.is_fallback());
        assert_eq!(fallback.cause(), Some(&"empty"));
        assert_eq!(fallback.into_value(), 2);
    }
}
