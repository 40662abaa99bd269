//! Container builder module for dependency injection.
//!
//! This module contains the ContainerBuilder type, which collects bindings,
//! conventions, interceptor providers and proxies, and freezes them into a
//! [`Container`].

use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::config::ContainerSettings;
use crate::error::{DiError, DiResult};
use crate::interception::{Interception, InterceptorProvider, InterfaceProxy, ProxyFn};
use crate::key::TypeKey;
use crate::policy::SingletonPolicy;
use crate::provider::Container;
use crate::registration::{Binding, Provider, ProviderAdapter, Registry};

const DEFAULT_NAME: &str = "default";

/// Collects the configuration of a [`Container`].
///
/// Everything is configured up front; [`build`](Self::build) freezes the
/// configuration and nothing can be removed or rebound afterwards.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 1_700_000_000 }
/// }
/// impl Component for FixedClock {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new()
///             .constructor(Constructor::new(|| FixedClock))
///             .implements::<dyn Clock>(|c| c as Arc<dyn Clock>)
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .name("scheduler")
///     .define_implementation::<dyn Clock, FixedClock>()
///     .unwrap();
///
/// let container = builder.build();
/// assert_eq!(container.name(), "scheduler");
/// assert_eq!(container.get_required::<dyn Clock>().now(), 1_700_000_000);
/// ```
pub struct ContainerBuilder {
    name: String,
    registry: Registry,
}

impl ContainerBuilder {
    /// Creates an empty builder using the default conventions and the
    /// marker-tag singleton policy.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            registry: Registry::new(),
        }
    }

    /// Names the container, for logs and diagnostics.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Makes `C` known to the container, so that it can be found by a naming
    /// convention or requested directly.
    pub fn component<C: Component>(&mut self) -> &mut Self {
        self.registry.catalog.register::<C>();
        self
    }

    /// Binds requests for `I` to the component `C`.
    ///
    /// Fails with [`DiError::Configuration`] unless `C` is `I` or declares
    /// that it implements `I`.
    pub fn define_implementation<I, C>(&mut self) -> DiResult<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        C: Component,
    {
        let key = TypeKey::of::<I>();
        let component = self.registry.catalog.entry::<C>();
        check_serves(component.info().serves(&key), &key, std::any::type_name::<C>())?;
        self.registry.catalog.insert(component.clone());
        self.registry
            .implementations
            .insert(key, Binding::Implementation(component));
        Ok(self)
    }

    /// Binds requests for `I` to values of `C` produced by `provider`.
    ///
    /// Inject-marked fields of each produced value are still populated.
    /// Provider bindings are never shared by the container; a provider that
    /// wants sharing returns clones of a shared value itself.
    pub fn define_provider<I, C, P>(&mut self, provider: P) -> DiResult<&mut Self>
    where
        I: ?Sized + Send + Sync + 'static,
        C: Component,
        P: Provider<C>,
    {
        let key = TypeKey::of::<I>();
        let component = self.registry.catalog.entry::<C>();
        check_serves(component.info().serves(&key), &key, std::any::type_name::<C>())?;
        self.registry.catalog.insert(component.clone());
        self.registry.providers.insert(
            key,
            Binding::Provider {
                component,
                provider: Arc::new(ProviderAdapter::<C, P>::new(provider)),
            },
        );
        Ok(self)
    }

    /// Appends a naming convention such as `"${package}.impl.${class}Impl"`.
    ///
    /// The first convention defined replaces the default ones.
    pub fn define_convention(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.registry
            .conventions
            .get_or_insert_with(Vec::new)
            .push(pattern.into());
        self
    }

    /// Disables convention lookup, including the defaults.
    pub fn clear_conventions(&mut self) -> &mut Self {
        self.registry.conventions = Some(Vec::new());
        self
    }

    /// Appends an interceptor provider. Providers are asked in the order
    /// they were added.
    pub fn define_interceptor_provider<P>(&mut self, provider: P) -> &mut Self
    where
        P: InterceptorProvider + 'static,
    {
        self.registry.interceptors.push(Arc::new(provider));
        self
    }

    /// Declares how to wrap instances of the interface `I` for interception.
    pub fn define_proxy<I>(
        &mut self,
        wrap: impl Fn(Arc<I>, Interception) -> Arc<I> + Send + Sync + 'static,
    ) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.registry
            .proxies
            .insert(TypeKey::of::<I>(), Arc::new(ProxyFn::<I>::new(wrap)));
        self
    }

    /// Registers a proxy type generated by
    /// [`interception_proxy!`](crate::interception_proxy).
    pub fn proxy<P: InterfaceProxy>(&mut self) -> &mut Self {
        self.define_proxy::<P::Interface>(P::wrap)
    }

    /// Replaces the singleton policy.
    pub fn singleton_policy<P>(&mut self, policy: P) -> &mut Self
    where
        P: SingletonPolicy + 'static,
    {
        self.registry.policy = Arc::new(policy);
        self
    }

    /// Applies data-only settings.
    pub fn with_settings(&mut self, settings: ContainerSettings) -> &mut Self {
        if let Some(name) = settings.name {
            self.name = name;
        }
        if let Some(conventions) = settings.conventions {
            self.registry.conventions = Some(conventions);
        }
        self
    }

    /// Applies settings read from JSON.
    #[cfg(feature = "config")]
    pub fn with_settings_json(&mut self, json: &str) -> DiResult<&mut Self> {
        let settings = ContainerSettings::from_json_str(json)?;
        Ok(self.with_settings(settings))
    }

    /// Freezes the configuration into a container.
    pub fn build(self) -> Container {
        Container::new(self.name, self.registry)
    }
}

fn check_serves(serves: bool, key: &TypeKey, component: &str) -> DiResult<()> {
    if serves {
        Ok(())
    } else {
        Err(DiError::Configuration(format!(
            "{} does not implement {}",
            component, key
        )))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("name", &self.name)
            .field("implementations", &self.registry.implementations.len())
            .field("providers", &self.registry.providers.len())
            .field("conventions", &self.registry.conventions())
            .field("interceptors", &self.registry.interceptors.len())
            .field("components", &self.registry.catalog.len())
            .finish()
    }
}
