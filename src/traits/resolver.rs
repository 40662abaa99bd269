//! Resolver traits for component resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::registration::unerase;

/// Core resolver trait for object-safe component resolution.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed generic methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves the instance for `key`.
    ///
    /// The returned value holds an `Arc<T>` for the keyed `T`, whether `T` is
    /// a concrete type or a trait object.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<dyn Any>)` - The resolved instance, type-erased
    /// * `Err(DiError)` - Resolution error (unresolvable, circular, construction failure, etc.)
    fn resolve_any(&self, key: &TypeKey) -> DiResult<Arc<dyn Any + Send + Sync>>;
}

/// High-level resolver interface with generic methods for type-safe
/// resolution.
///
/// `T` may be a concrete component or a trait object; both come back as
/// `Arc<T>`.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, DiError, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
/// trait Metrics: Send + Sync {}
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
/// impl Component for ConsoleLogger {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new()
///             .constructor(Constructor::new(|| ConsoleLogger))
///             .implements::<dyn Logger>(|c| c as Arc<dyn Logger>)
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.define_implementation::<dyn Logger, ConsoleLogger>().unwrap();
/// let container = builder.build();
///
/// let logger = container.get_instance::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("ready"), "LOG: ready");
///
/// assert!(container.try_get_instance::<dyn Metrics>().unwrap().is_none());
/// assert!(matches!(
///     container.get_instance::<dyn Metrics>(),
///     Err(DiError::Unresolvable(_))
/// ));
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves an instance of `T`.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<T>)` - The resolved instance
    /// * `Err(DiError)` - Resolution error (unresolvable, circular, construction failure, etc.)
    fn get_instance<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = TypeKey::of::<T>();
        let any = self.resolve_any(&key)?;
        unerase::<T>(&any).ok_or(DiError::TypeMismatch(key.display_name()))
    }

    /// Resolves an instance of `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if `T` cannot be resolved.
    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.get_instance::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves an instance of `T`, or `None` when nothing can serve `T`.
    ///
    /// Only the requested type being unresolvable yields `None`; any other
    /// failure, including an unresolvable dependency, is an error.
    fn try_get_instance<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get_instance::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(DiError::Unresolvable(name)) if name == std::any::type_name::<T>() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
