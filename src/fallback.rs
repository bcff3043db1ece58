//! Values that may have been substituted with a default.
//!
//! Loading the store, loading the cursor, and parsing dates never fail on bad
//! input; they fall back to a default instead. `Fallback` records which path
//! was taken so callers can log it and tests can assert on it.

/// A value that was either read successfully or replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback<T> {
    /// The value came from the input.
    Loaded(T),
    /// The input was missing or unusable; `value` is the default.
    Defaulted { value: T, reason: String },
}

impl<T> Fallback<T> {
    pub fn defaulted(value: T, reason: impl Into<String>) -> Self {
        Fallback::Defaulted {
            value,
            reason: reason.into(),
        }
    }

    /// Returns true if the default was used.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Fallback::Defaulted { .. })
    }

    /// Why the default was used, if it was.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Fallback::Loaded(_) => None,
            Fallback::Defaulted { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Fallback::Loaded(value) | Fallback::Defaulted { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fallback::Loaded(value) | Fallback::Defaulted { value, .. } => value,
        }
    }

    /// Maps the carried value, keeping the loaded/defaulted marker.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fallback<U> {
        match self {
            Fallback::Loaded(value) => Fallback::Loaded(f(value)),
            Fallback::Defaulted { value, reason } => Fallback::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded() {
        let v = Fallback::Loaded(5);
        assert!(!v.is_defaulted());
        assert_eq!(v.reason(), None);
        assert_eq!(*v.value(), 5);
    }

    #[test]
    fn test_defaulted_keeps_reason_through_map() {
        let v = Fallback::defaulted(219u64, "file missing").map(|n| n + 1);
        assert!(v.is_defaulted());
        assert_eq!(v.reason(), Some("file missing"));
        assert_eq!(v.into_inner(), 220);
    }
}
