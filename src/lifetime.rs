//! Component lifetime definitions.

use std::fmt;

/// Component lifetimes controlling instance caching behavior
///
/// The lifetime of a definition is decided once, when the definition is
/// created, by the container's [`SingletonPolicy`](crate::SingletonPolicy).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Lifetime;
///
/// assert!(Lifetime::Singleton.is_singleton());
/// assert!(!Lifetime::Transient.is_singleton());
/// assert_eq!(Lifetime::from_singleton_flag(true), Lifetime::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per definition, created lazily and cached forever
    ///
    /// Singleton components are created on first request and shared across
    /// all callers and threads resolving the same requested type.
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    pub fn from_singleton_flag(singleton: bool) -> Self {
        if singleton {
            Lifetime::Singleton
        } else {
            Lifetime::Transient
        }
    }

    pub fn is_singleton(self) -> bool {
        self == Lifetime::Singleton
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
