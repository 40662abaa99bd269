//! Binding registration types.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::component::{Component, ErasedComponent, ErasedProvider};
use crate::error::BoxError;
use crate::interception::{ErasedProxy, InterceptorProvider};
use crate::key::TypeKey;
use crate::naming::DEFAULT_CONVENTIONS;
use crate::policy::{MarkerTagPolicy, SingletonPolicy};

// Type-erased Arc for storage. The erased value is always an `Arc<T>` for the
// keyed `T`, so trait objects and sized types share one representation.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(arc: Arc<T>) -> AnyArc {
    Arc::new(arc)
}

#[inline]
pub(crate) fn unerase<T: ?Sized + Send + Sync + 'static>(any: &AnyArc) -> Option<Arc<T>> {
    any.downcast_ref::<Arc<T>>().cloned()
}

/// Factory producing component values on demand.
///
/// Closures returning `Result<C, BoxError>` are providers.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{BoxError, Provider};
///
/// struct Connection { url: String }
///
/// let provider = || -> Result<Connection, BoxError> {
///     Ok(Connection { url: "sqlite::memory:".to_string() })
/// };
/// assert_eq!(provider.get().unwrap().url, "sqlite::memory:");
/// ```
pub trait Provider<C>: Send + Sync + 'static {
    fn get(&self) -> Result<C, BoxError>;
}

impl<C, F> Provider<C> for F
where
    F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
{
    fn get(&self) -> Result<C, BoxError> {
        self()
    }
}

pub(crate) struct ProviderAdapter<C, P> {
    provider: P,
    _component: PhantomData<fn() -> C>,
}

impl<C, P> ProviderAdapter<C, P> {
    pub(crate) fn new(provider: P) -> Self {
        Self {
            provider,
            _component: PhantomData,
        }
    }
}

impl<C, P> ErasedProvider for ProviderAdapter<C, P>
where
    C: Component,
    P: Provider<C>,
{
    fn produce(&self) -> Result<Box<dyn Any + Send>, BoxError> {
        let value = self.provider.get()?;
        Ok(Box::new(value))
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<P>()
    }
}

/// An explicit binding for a requested type.
#[derive(Clone)]
pub(crate) enum Binding {
    Implementation(Arc<dyn ErasedComponent>),
    Provider {
        component: Arc<dyn ErasedComponent>,
        provider: Arc<dyn ErasedProvider>,
    },
}

/// Every concrete component known to the container, by type and by name.
#[derive(Default)]
pub(crate) struct Catalog {
    by_type: HashMap<TypeId, Arc<dyn ErasedComponent>>,
    by_name: HashMap<String, Arc<dyn ErasedComponent>>,
}

impl Catalog {
    /// Adds `C` once; later calls return the catalogued entry.
    pub(crate) fn register<C: Component>(&mut self) -> Arc<dyn ErasedComponent> {
        let component = self.entry::<C>();
        self.insert(component.clone());
        component
    }

    /// The catalogued entry for `C`, or a new one that is not catalogued yet.
    pub(crate) fn entry<C: Component>(&self) -> Arc<dyn ErasedComponent> {
        match self.by_type.get(&TypeId::of::<C>()) {
            Some(existing) => existing.clone(),
            None => Arc::new(C::component_type()),
        }
    }

    /// Catalogues `component` unless its type already is. A component
    /// declaring a name already in use replaces the earlier one for name
    /// lookups.
    pub(crate) fn insert(&mut self, component: Arc<dyn ErasedComponent>) {
        let info = component.info();
        let type_id = info.key().type_id();
        if self.by_type.contains_key(&type_id) {
            return;
        }

        let name = info.name().to_string();
        if let Some(shadowed) = self.by_name.get(&name) {
            warn!(
                name = %name,
                shadowed = shadowed.info().key().display_name(),
                component = info.key().display_name(),
                "Component name already catalogued, later component replaces it"
            );
        }
        self.by_type.insert(type_id, component.clone());
        self.by_name.insert(name, component);
    }

    pub(crate) fn by_type(&self, key: &TypeKey) -> Option<&Arc<dyn ErasedComponent>> {
        self.by_type.get(&key.type_id())
    }

    pub(crate) fn by_name(&self, name: &str) -> Option<&Arc<dyn ErasedComponent>> {
        self.by_name.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_type.len()
    }
}

/// Configuration collected by the builder, read-only once the container is
/// built.
pub(crate) struct Registry {
    pub(crate) implementations: HashMap<TypeKey, Binding>,
    pub(crate) providers: HashMap<TypeKey, Binding>,
    /// `None` until a convention is defined explicitly; the defaults apply
    /// meanwhile.
    pub(crate) conventions: Option<Vec<String>>,
    pub(crate) interceptors: Vec<Arc<dyn InterceptorProvider>>,
    pub(crate) proxies: HashMap<TypeKey, Arc<dyn ErasedProxy>>,
    pub(crate) policy: Arc<dyn SingletonPolicy>,
    pub(crate) catalog: Catalog,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            implementations: HashMap::new(),
            providers: HashMap::new(),
            conventions: None,
            interceptors: Vec::new(),
            proxies: HashMap::new(),
            policy: Arc::new(MarkerTagPolicy::new()),
            catalog: Catalog::default(),
        }
    }

    /// Conventions in the order they are tried.
    pub(crate) fn conventions(&self) -> Vec<&str> {
        match &self.conventions {
            Some(explicit) => explicit.iter().map(String::as_str).collect(),
            None => DEFAULT_CONVENTIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, Constructor};

    struct Widget;

    impl Component for Widget {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new()
                .named("shop.WidgetImpl")
                .constructor(Constructor::new(|| Widget))
        }
    }

    #[test]
    fn test_catalog_registers_once() {
        let mut catalog = Catalog::default();
        let first = catalog.register::<Widget>();
        let second = catalog.register::<Widget>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.by_name("shop.WidgetImpl").is_some());
        assert!(catalog.by_type(&TypeKey::of::<Widget>()).is_some());
        assert!(catalog.by_name("shop.Widget").is_none());
    }

    struct OtherWidget;

    impl Component for OtherWidget {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new()
                .named("shop.WidgetImpl")
                .constructor(Constructor::new(|| OtherWidget))
        }
    }

    #[test]
    fn test_entry_does_not_catalogue() {
        let mut catalog = Catalog::default();
        let entry = catalog.entry::<Widget>();
        assert_eq!(catalog.len(), 0);
        assert!(catalog.by_name("shop.WidgetImpl").is_none());

        catalog.insert(entry.clone());
        assert!(Arc::ptr_eq(&entry, &catalog.entry::<Widget>()));
    }

    #[test]
    fn test_later_name_replaces_earlier() {
        let mut catalog = Catalog::default();
        catalog.register::<Widget>();
        catalog.register::<OtherWidget>();

        assert_eq!(catalog.len(), 2);
        let named = catalog.by_name("shop.WidgetImpl").unwrap();
        assert_eq!(named.info().key(), TypeKey::of::<OtherWidget>());
        // still reachable by type
        assert!(catalog.by_type(&TypeKey::of::<Widget>()).is_some());
    }

    #[test]
    fn test_default_conventions_until_explicit() {
        let mut registry = Registry::new();
        assert_eq!(registry.conventions(), DEFAULT_CONVENTIONS.to_vec());

        registry.conventions = Some(vec!["${package}.spi.${class}".to_string()]);
        assert_eq!(registry.conventions(), vec!["${package}.spi.${class}"]);

        registry.conventions = Some(Vec::new());
        assert!(registry.conventions().is_empty());
    }

    #[test]
    fn test_provider_closure() {
        let provider = || -> Result<Widget, BoxError> { Ok(Widget) };
        let adapter = ProviderAdapter::<Widget, _>::new(provider);
        let produced = adapter.produce().unwrap();
        assert!(produced.downcast::<Widget>().is_ok());
    }
}
