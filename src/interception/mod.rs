//! Call interception for interface-typed components.
//!
//! When at least one [`InterceptorProvider`] is registered, every component
//! requested through an interface is handed out wrapped in a proxy generated by
//! [`interception_proxy!`](crate::interception_proxy). Each call on the proxy
//! asks the providers, in registration order, for an [`Interceptor`]; the
//! interceptors collected this way see the call:
//!
//! - before-hooks run in provider order,
//! - after-hooks run in reverse order with the returned value,
//! - error-hooks run in reverse order when the call fails or panics, and the
//!   failure then reaches the caller unchanged.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::component::ComponentInfo;
use crate::key::TypeKey;
use crate::registration::{unerase, AnyArc};

mod proxy;

pub use proxy::{Interception, InterfaceProxy};
pub(crate) use proxy::{ErasedProxy, ProxyFn};

/// Hooks run around one intercepted call.
///
/// An interceptor is obtained fresh for every call, so it may keep per-call
/// state (a start time, a transaction) in `self`.
pub trait Interceptor: Send {
    /// Execute before the target method
    fn before_call(&mut self) {}

    /// Execute after the target method returned normally. `result` is the
    /// returned value (the `Ok` value for fallible methods).
    fn after_call(&mut self, result: &dyn Any) {
        let _ = result;
    }

    /// Execute after the target method failed. Panics are reported as
    /// [`CallPanicked`].
    fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        let _ = error;
    }
}

/// Supplies interceptors per method call.
///
/// Returning `None` leaves the call alone.
pub trait InterceptorProvider: Send + Sync {
    fn interceptor(&self, method: &MethodDescriptor, target: &Target) -> Option<Box<dyn Interceptor>>;
}

/// Adapts a closure into an [`InterceptorProvider`].
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{FnInterceptorProvider, Interceptor, ContainerBuilder};
///
/// struct Trace;
/// impl Interceptor for Trace {
///     fn before_call(&mut self) {
///         println!("calling");
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.define_interceptor_provider(FnInterceptorProvider::new(|method, _target| {
///     if method.has_tag("traced") {
///         Some(Box::new(Trace) as Box<dyn Interceptor>)
///     } else {
///         None
///     }
/// }));
/// ```
pub struct FnInterceptorProvider<F> {
    f: F,
}

impl<F> FnInterceptorProvider<F>
where
    F: Fn(&MethodDescriptor, &Target) -> Option<Box<dyn Interceptor>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> InterceptorProvider for FnInterceptorProvider<F>
where
    F: Fn(&MethodDescriptor, &Target) -> Option<Box<dyn Interceptor>> + Send + Sync,
{
    fn interceptor(&self, method: &MethodDescriptor, target: &Target) -> Option<Box<dyn Interceptor>> {
        (self.f)(method, target)
    }
}

/// An interface method, as seen by interceptor providers.
#[derive(Debug, Clone, Copy)]
pub struct MethodDescriptor {
    interface: TypeKey,
    name: &'static str,
    tags: &'static [&'static str],
}

impl MethodDescriptor {
    pub fn new(interface: TypeKey, name: &'static str, tags: &'static [&'static str]) -> Self {
        Self { interface, name, tags }
    }

    /// The interface declaring the method.
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Tags declared on the interface method.
    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.interface.qualified_name().simple_name(), self.name)
    }
}

/// The implementation behind a proxy: its metadata and the instance itself.
#[derive(Debug, Clone)]
pub struct Target {
    info: Arc<ComponentInfo>,
    instance: AnyArc,
}

impl Target {
    /// `instance` is the erased `Arc<C>` of the component described by `info`.
    pub(crate) fn new(info: Arc<ComponentInfo>, instance: AnyArc) -> Self {
        Self { info, instance }
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    /// The wrapped instance, if the implementation is a `C`.
    ///
    /// ```rust
    /// use ferrous_injector::{FnInterceptorProvider, Interceptor};
    ///
    /// struct Pool { size: usize }
    /// struct Trace;
    /// impl Interceptor for Trace {}
    ///
    /// let only_large_pools = FnInterceptorProvider::new(|_method, target| {
    ///     match target.downcast::<Pool>() {
    ///         Some(pool) if pool.size > 8 => Some(Box::new(Trace) as Box<dyn Interceptor>),
    ///         _ => None,
    ///     }
    /// });
    /// # let _ = only_large_pools;
    /// ```
    pub fn downcast<C: Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        unerase::<C>(&self.instance)
    }

    /// Returns true if the implementation tagged `method` with `tag`.
    pub fn has_tag(&self, method: &MethodDescriptor, tag: &str) -> bool {
        self.info.method_has_tag(method.name(), tag)
    }
}

/// Returns true if `tag` is declared on the interface method or, failing
/// that, on the implementation's method.
pub fn annotation_exists(method: &MethodDescriptor, target: &Target, tag: &str) -> bool {
    method.has_tag(tag) || target.has_tag(method, tag)
}

/// Error shown to error-hooks when the intercepted call panicked.
#[derive(Debug, Error)]
#[error("intercepted call {method} panicked: {message}")]
pub struct CallPanicked {
    pub method: &'static str,
    pub message: String,
}

impl CallPanicked {
    pub(crate) fn from_payload(method: &'static str, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { method, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use crate::registration::erase;

    trait Ledger: Send + Sync {}
    struct BookLedger {
        pages: u32,
    }

    fn target() -> Target {
        let ty: ComponentType<BookLedger> = ComponentType::new().method_tag("post", "transactional");
        Target::new(Arc::new(ty.info().clone()), erase(Arc::new(BookLedger { pages: 12 })))
    }

    #[test]
    fn test_target_exposes_instance() {
        let target = target();
        assert_eq!(target.downcast::<BookLedger>().map(|l| l.pages), Some(12));
        assert!(target.downcast::<String>().is_none());
    }

    #[test]
    fn test_annotation_lookup_interface_then_implementation() {
        let target = target();
        let post = MethodDescriptor::new(TypeKey::of::<dyn Ledger>(), "post", &["audited"]);
        let read = MethodDescriptor::new(TypeKey::of::<dyn Ledger>(), "read", &[]);

        assert!(annotation_exists(&post, &target, "audited"));
        assert!(annotation_exists(&post, &target, "transactional"));
        assert!(!annotation_exists(&read, &target, "transactional"));
        assert!(!target.has_tag(&post, "audited"));
    }

    #[test]
    fn test_method_display() {
        let post = MethodDescriptor::new(TypeKey::of::<dyn Ledger>(), "post", &[]);
        assert_eq!(post.to_string(), "Ledger::post");
    }

    #[test]
    fn test_panic_payload_messages() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(CallPanicked::from_payload("m", s.as_ref()).message, "boom");
        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(CallPanicked::from_payload("m", s.as_ref()).message, "bang");
        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(
            CallPanicked::from_payload("m", s.as_ref()).to_string(),
            "intercepted call m panicked: non-string panic payload"
        );
    }
}
