//! Error types for the dependency injection container.

use thiserror::Error;

/// Boxed error used to carry the underlying cause of construction and
/// injection failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependency injection errors
///
/// Represents the failures that can surface while configuring a
/// [`ContainerBuilder`](crate::ContainerBuilder) or while resolving a
/// component from a [`Container`](crate::Container).
///
/// Errors returned by intercepted methods are never converted into a
/// `DiError`; they reach the caller exactly as the component returned them.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::DiError;
///
/// let unresolvable = DiError::Unresolvable("dyn app::Mailer");
/// let circular = DiError::Circular(vec!["app::A", "app::B", "app::A"]);
///
/// assert_eq!(unresolvable.to_string(), "Cannot get implementation or provider for: dyn app::Mailer");
/// assert_eq!(circular.to_string(), "Circular dependency: app::A -> app::B -> app::A");
/// ```
#[derive(Debug, Error)]
pub enum DiError {
    /// A binding failed its capability or concreteness check
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// No binding, provider or convention candidate, and the type is not concrete
    #[error("Cannot get implementation or provider for: {0}")]
    Unresolvable(&'static str),
    /// Constructor selection could not settle on a single constructor
    #[error("Ambiguous constructor for {component}: {reason}")]
    AmbiguousConstructor {
        component: &'static str,
        reason: String,
    },
    /// The component declares no public constructor
    #[error("No accessible constructor for: {0}")]
    NoConstructor(&'static str),
    /// The constructor or provider failed
    #[error("Cannot create instance of {component}")]
    Construction {
        component: &'static str,
        #[source]
        source: BoxError,
    },
    /// A field could not be assigned after construction
    #[error("Cannot inject field '{field}' of {component}")]
    Injection {
        component: &'static str,
        field: &'static str,
        #[source]
        source: BoxError,
    },
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Container settings could not be read
    #[error("Invalid container settings: {0}")]
    Settings(String),
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
