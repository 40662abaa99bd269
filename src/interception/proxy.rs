//! Proxy plumbing: the per-call interception driver and the wrapper types
//! generated for interfaces.

use std::convert::Infallible;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::trace;

use super::{CallPanicked, Interceptor, InterceptorProvider, MethodDescriptor, Target};
use crate::key::TypeKey;
use crate::registration::{erase, unerase, AnyArc};

/// Drives interceptors around the calls made through one proxy.
///
/// Proxies generated by [`interception_proxy!`](crate::interception_proxy)
/// hold one `Interception` and route every method through
/// [`invoke`](Self::invoke) or [`invoke_infallible`](Self::invoke_infallible).
#[derive(Clone)]
pub struct Interception {
    interface: TypeKey,
    target: Target,
    providers: Arc<[Arc<dyn InterceptorProvider>]>,
}

impl Interception {
    pub(crate) fn new(
        interface: TypeKey,
        target: Target,
        providers: Arc<[Arc<dyn InterceptorProvider>]>,
    ) -> Self {
        Self {
            interface,
            target,
            providers,
        }
    }

    /// The interface the proxy stands for.
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    fn interceptors(&self, method: &MethodDescriptor) -> Vec<Box<dyn Interceptor>> {
        self.providers
            .iter()
            .filter_map(|p| p.interceptor(method, &self.target))
            .collect()
    }

    /// Runs a fallible call through the interceptors.
    ///
    /// The result, `Ok` or `Err`, is returned exactly as `call` produced it.
    /// A panic in `call` runs the error-hooks and then continues unwinding with
    /// the original payload.
    pub fn invoke<R, E, F>(&self, method: &MethodDescriptor, call: F) -> Result<R, E>
    where
        R: 'static,
        E: std::error::Error + 'static,
        F: FnOnce() -> Result<R, E>,
    {
        let mut chain = self.interceptors(method);
        if chain.is_empty() {
            return call();
        }
        trace!(method = %method, interceptors = chain.len(), "Intercepting call");

        for interceptor in chain.iter_mut() {
            interceptor.before_call();
        }

        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(value)) => {
                for interceptor in chain.iter_mut().rev() {
                    interceptor.after_call(&value);
                }
                Ok(value)
            }
            Ok(Err(error)) => {
                for interceptor in chain.iter_mut().rev() {
                    interceptor.on_error(&error);
                }
                Err(error)
            }
            Err(payload) => {
                let panicked = CallPanicked::from_payload(method.name(), payload.as_ref());
                for interceptor in chain.iter_mut().rev() {
                    interceptor.on_error(&panicked);
                }
                panic::resume_unwind(payload)
            }
        }
    }

    /// Runs a call that cannot fail through the interceptors.
    pub fn invoke_infallible<R, F>(&self, method: &MethodDescriptor, call: F) -> R
    where
        R: 'static,
        F: FnOnce() -> R,
    {
        match self.invoke(method, || Ok::<R, Infallible>(call())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl fmt::Debug for Interception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interception")
            .field("interface", &self.interface)
            .field("target", &self.target.info().name())
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// A wrapper type standing in for an interface.
///
/// Implemented by the types [`interception_proxy!`](crate::interception_proxy)
/// generates; register one per interface with
/// [`ContainerBuilder::proxy`](crate::ContainerBuilder::proxy).
pub trait InterfaceProxy: Send + Sync + 'static {
    type Interface: ?Sized + Send + Sync + 'static;

    fn wrap(target: Arc<Self::Interface>, interception: Interception) -> Arc<Self::Interface>;
}

/// Type-erased proxy factory, keyed by interface in the registry.
pub(crate) trait ErasedProxy: Send + Sync {
    fn wrap(&self, target: &AnyArc, interception: Interception) -> Option<AnyArc>;
}

type WrapFn<I> = Arc<dyn Fn(Arc<I>, Interception) -> Arc<I> + Send + Sync>;

pub(crate) struct ProxyFn<I: ?Sized> {
    wrap: WrapFn<I>,
}

impl<I: ?Sized + Send + Sync + 'static> ProxyFn<I> {
    pub(crate) fn new<F>(wrap: F) -> Self
    where
        F: Fn(Arc<I>, Interception) -> Arc<I> + Send + Sync + 'static,
    {
        Self { wrap: Arc::new(wrap) }
    }
}

impl<I: ?Sized + Send + Sync + 'static> ErasedProxy for ProxyFn<I> {
    fn wrap(&self, target: &AnyArc, interception: Interception) -> Option<AnyArc> {
        let target = unerase::<I>(target)?;
        Some(erase::<I>((self.wrap)(target, interception)))
    }
}

/// Generates the proxy type for an interface.
///
/// Every interface method is listed with its signature. Methods returning
/// `Result<_, E>` with `E: std::error::Error` are declared `fallible` so that
/// error-hooks see the `Err`; all others are plain. Methods may carry
/// `#[tag = "..."]` attributes, visible to interceptor providers through
/// [`MethodDescriptor::has_tag`](crate::MethodDescriptor::has_tag). Return
/// types must be owned (`'static`).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{
///     interception_proxy, Component, ComponentType, Constructor, ContainerBuilder,
///     FnInterceptorProvider, Interceptor, Resolver,
/// };
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Debug)]
/// pub struct Bounced;
/// impl std::fmt::Display for Bounced {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("bounced")
///     }
/// }
/// impl std::error::Error for Bounced {}
///
/// pub trait Mailer: Send + Sync {
///     fn queued(&self) -> usize;
///     fn send(&self, to: &str) -> Result<(), Bounced>;
/// }
///
/// interception_proxy! {
///     pub struct MailerProxy for dyn Mailer {
///         fn queued(&self) -> usize;
///         #[tag = "audited"]
///         fallible fn send(&self, to: &str) -> Result<(), Bounced>;
///     }
/// }
///
/// struct SmtpMailer;
/// impl Mailer for SmtpMailer {
///     fn queued(&self) -> usize { 0 }
///     fn send(&self, to: &str) -> Result<(), Bounced> {
///         if to.contains('@') { Ok(()) } else { Err(Bounced) }
///     }
/// }
/// impl Component for SmtpMailer {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new()
///             .constructor(Constructor::new(|| SmtpMailer))
///             .implements::<dyn Mailer>(|m| m as Arc<dyn Mailer>)
///     }
/// }
///
/// struct Audit(Arc<Mutex<Vec<String>>>);
/// impl Interceptor for Audit {
///     fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
///         self.0.lock().unwrap().push(error.to_string());
///     }
/// }
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let sink = log.clone();
///
/// let mut builder = ContainerBuilder::new();
/// builder.define_implementation::<dyn Mailer, SmtpMailer>().unwrap();
/// builder.proxy::<MailerProxy>();
/// builder.define_interceptor_provider(FnInterceptorProvider::new(move |method, _| {
///     method
///         .has_tag("audited")
///         .then(|| Box::new(Audit(sink.clone())) as Box<dyn Interceptor>)
/// }));
///
/// let mailer = builder.build().get_required::<dyn Mailer>();
/// assert!(mailer.send("ada@example.com").is_ok());
/// assert!(mailer.send("nobody").is_err());
/// assert_eq!(*log.lock().unwrap(), vec!["bounced".to_string()]);
/// ```
#[macro_export]
macro_rules! interception_proxy {
    (
        $(#[$meta:meta])*
        $vis:vis struct $proxy:ident for dyn $iface:path {
            $($body:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis struct $proxy {
            target: ::std::sync::Arc<dyn $iface>,
            interception: $crate::Interception,
        }

        impl $crate::InterfaceProxy for $proxy {
            type Interface = dyn $iface;

            fn wrap(
                target: ::std::sync::Arc<dyn $iface>,
                interception: $crate::Interception,
            ) -> ::std::sync::Arc<dyn $iface> {
                ::std::sync::Arc::new($proxy { target, interception })
            }
        }

        impl $iface for $proxy {
            $crate::interception_proxy!(@methods [dyn $iface] $($body)*);
        }
    };

    (@methods [$iface:ty]) => {};

    (@methods [$iface:ty]
        $(#[tag = $tag:literal])*
        fallible fn $name:ident(&self $(, $arg:ident : $argty:ty)*) -> $ret:ty;
        $($rest:tt)*
    ) => {
        fn $name(&self $(, $arg: $argty)*) -> $ret {
            let method = $crate::MethodDescriptor::new(
                $crate::TypeKey::of::<$iface>(),
                stringify!($name),
                &[$($tag),*],
            );
            let target = &self.target;
            self.interception.invoke(&method, move || target.$name($($arg),*))
        }

        $crate::interception_proxy!(@methods [$iface] $($rest)*);
    };

    (@methods [$iface:ty]
        $(#[tag = $tag:literal])*
        fn $name:ident(&self $(, $arg:ident : $argty:ty)*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        fn $name(&self $(, $arg: $argty)*) $(-> $ret)? {
            let method = $crate::MethodDescriptor::new(
                $crate::TypeKey::of::<$iface>(),
                stringify!($name),
                &[$($tag),*],
            );
            let target = &self.target;
            self.interception.invoke_infallible(&method, move || target.$name($($arg),*))
        }

        $crate::interception_proxy!(@methods [$iface] $($rest)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use parking_lot::Mutex;
    use std::any::Any;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recording {
        label: &'static str,
        log: Log,
    }

    impl Interceptor for Recording {
        fn before_call(&mut self) {
            self.log.lock().push(format!("before {}", self.label));
        }

        fn after_call(&mut self, result: &dyn Any) {
            let shown = result
                .downcast_ref::<u32>()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string());
            self.log.lock().push(format!("after {} {}", self.label, shown));
        }

        fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
            let kind = if error.is::<CallPanicked>() { "panic" } else { "error" };
            self.log.lock().push(format!("{} {} {}", kind, self.label, error));
        }
    }

    struct RecordingProvider {
        label: &'static str,
        log: Log,
        only: Option<&'static str>,
    }

    impl InterceptorProvider for RecordingProvider {
        fn interceptor(&self, method: &MethodDescriptor, _target: &Target) -> Option<Box<dyn Interceptor>> {
            if self.only.map_or(false, |m| m != method.name()) {
                return None;
            }
            Some(Box::new(Recording {
                label: self.label,
                log: self.log.clone(),
            }))
        }
    }

    #[derive(Debug, PartialEq)]
    struct Refused(&'static str);

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "refused {}", self.0)
        }
    }

    impl std::error::Error for Refused {}

    trait Vault: Send + Sync {}
    struct SteelVault;

    fn interception(log: &Log, only: Option<&'static str>) -> Interception {
        let ty: ComponentType<SteelVault> = ComponentType::new();
        let providers: Vec<Arc<dyn InterceptorProvider>> = vec![
            Arc::new(RecordingProvider { label: "A", log: log.clone(), only }),
            Arc::new(RecordingProvider { label: "B", log: log.clone(), only }),
        ];
        Interception::new(
            TypeKey::of::<dyn Vault>(),
            Target::new(Arc::new(ty.info().clone()), erase(Arc::new(SteelVault))),
            providers.into(),
        )
    }

    fn method(name: &'static str) -> MethodDescriptor {
        MethodDescriptor::new(TypeKey::of::<dyn Vault>(), name, &[])
    }

    #[test]
    fn test_hooks_wrap_successful_call() {
        let log = Log::default();
        let value = interception(&log, None).invoke_infallible(&method("count"), || {
            log.lock().push("call".to_string());
            42u32
        });

        assert_eq!(value, 42);
        assert_eq!(
            *log.lock(),
            vec!["before A", "before B", "call", "after B 42", "after A 42"]
        );
    }

    #[test]
    fn test_error_returned_unchanged() {
        let log = Log::default();
        let result: Result<u32, Refused> =
            interception(&log, None).invoke(&method("open"), || Err(Refused("door")));

        assert_eq!(result, Err(Refused("door")));
        assert_eq!(
            *log.lock(),
            vec!["before A", "before B", "error B refused door", "error A refused door"]
        );
    }

    #[test]
    fn test_panic_resumes_original_payload() {
        let log = Log::default();
        let interception = interception(&log, None);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            interception.invoke_infallible(&method("open"), || -> u32 {
                panic::panic_any(Refused("lock"))
            })
        }));

        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<Refused>(), Some(&Refused("lock")));
        let log = log.lock();
        assert_eq!(log.len(), 4);
        assert!(log[2].starts_with("panic B"));
        assert!(log[3].starts_with("panic A"));
    }

    #[test]
    fn test_no_interceptors_means_plain_call() {
        let log = Log::default();
        let value = interception(&log, Some("other")).invoke_infallible(&method("count"), || 7u32);

        assert_eq!(value, 7);
        assert!(log.lock().is_empty());
    }
}
