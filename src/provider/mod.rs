//! The container: resolves requested types to instances.
//!
//! This module contains the [`Container`] type, the per-type
//! [`ComponentDefinition`](definition::ComponentDefinition) cache it keeps, and
//! the context used to resolve dependencies while a component is built.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::component::ErasedComponent;
use crate::error::{DiError, DiResult};
use crate::interception::InterceptorProvider;
use crate::internal::{InitTracker, ResolutionChain};
use crate::key::TypeKey;
use crate::naming;
use crate::registration::{AnyArc, Binding, Registry};
use crate::traits::{Resolver, ResolverCore};

pub(crate) mod context;
pub(crate) mod definition;

pub use definition::{DefinitionInfo, Source};
use context::ResolutionContext;
use definition::{ComponentDefinition, DefinitionParts};

/// Resolves components from the configuration frozen by
/// [`ContainerBuilder::build`](crate::ContainerBuilder::build).
///
/// For each requested type the container works out, once, a definition: which
/// component serves it, how that component is constructed, whether instances
/// are shared, and whether they are wrapped for interception. Definitions are
/// cached under the requested type for the life of the container.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it uses `Arc` internally).
/// A singleton is constructed at most once, even when several threads request
/// it for the first time concurrently. Singletons depending on each other fail
/// with [`DiError::Circular`] on every thread instead of blocking.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// impl Component for Database {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new()
///             .singleton()
///             .constructor(Constructor::new(|| Database { url: "postgres://localhost".to_string() }))
///     }
/// }
///
/// impl Component for UserService {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new().constructor(
///             Constructor::with_args(|args| Ok(UserService { db: args.next::<Database>()? }))
///                 .param::<Database>(),
///         )
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.component::<Database>().component::<UserService>();
///
/// let container = builder.build();
/// let users = container.get_required::<UserService>();
/// assert_eq!(users.db.url, "postgres://localhost");
/// assert!(Arc::ptr_eq(&users.db, &container.get_required::<Database>()));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    name: String,
    registry: Registry,
    interceptors: Arc<[Arc<dyn InterceptorProvider>]>,
    definitions: RwLock<HashMap<TypeKey, Arc<ComponentDefinition>>>,
    singletons_in_progress: InitTracker,
}

impl Container {
    pub(crate) fn new(name: String, mut registry: Registry) -> Self {
        let interceptors: Arc<[Arc<dyn InterceptorProvider>]> =
            std::mem::take(&mut registry.interceptors).into();
        Self {
            inner: Arc::new(ContainerInner {
                name,
                registry,
                interceptors,
                definitions: RwLock::new(HashMap::new()),
                singletons_in_progress: InitTracker::default(),
            }),
        }
    }

    /// Name given to the container at build time.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Resolves `key` on the call path recorded in `chain`.
    pub(crate) fn resolve_key(&self, key: &TypeKey, chain: &mut ResolutionChain) -> DiResult<AnyArc> {
        chain.scoped(*key, |chain| {
            let definition = self.definition(key)?;
            definition.get_instance(&mut ResolutionContext::new(self, chain))
        })
    }

    pub(crate) fn singletons_in_progress(&self) -> &InitTracker {
        &self.inner.singletons_in_progress
    }

    fn definition(&self, key: &TypeKey) -> DiResult<Arc<ComponentDefinition>> {
        if let Some(existing) = self.inner.definitions.read().get(key) {
            trace!(container = %self.inner.name, requested = %key, "Definition cache hit");
            return Ok(existing.clone());
        }

        let created = Arc::new(self.create_definition(key)?);
        // first inserted definition wins; a racer adopts it
        let mut definitions = self.inner.definitions.write();
        Ok(definitions.entry(*key).or_insert(created).clone())
    }

    fn create_definition(&self, key: &TypeKey) -> DiResult<ComponentDefinition> {
        let parts = self.locate(key)?;
        let singleton = self.inner.registry.policy.is_singleton(parts.component.info());
        let proxy = self.inner.registry.proxies.get(key).cloned();
        ComponentDefinition::new(parts, singleton, proxy, &self.inner.interceptors)
    }

    /// Finds the component serving `key`: explicit binding, then provider,
    /// then conventions, then the type itself.
    fn locate(&self, key: &TypeKey) -> DiResult<DefinitionParts> {
        let registry = &self.inner.registry;

        if let Some(binding) = registry.implementations.get(key) {
            return Ok(parts_of(*key, Source::Implementation, binding));
        }
        if let Some(binding) = registry.providers.get(key) {
            return Ok(parts_of(*key, Source::Provider, binding));
        }
        if let Some(component) = self.by_convention(key) {
            return Ok(DefinitionParts {
                requested: *key,
                source: Source::Convention,
                component,
                provider: None,
            });
        }
        if !key.is_interface() {
            if let Some(component) = registry.catalog.by_type(key) {
                return Ok(DefinitionParts {
                    requested: *key,
                    source: Source::SelfBound,
                    component: component.clone(),
                    provider: None,
                });
            }
        }

        Err(DiError::Unresolvable(key.display_name()))
    }

    fn by_convention(&self, key: &TypeKey) -> Option<Arc<dyn ErasedComponent>> {
        let registry = &self.inner.registry;
        let name = match registry.catalog.by_type(key) {
            Some(component) => component.info().name().clone(),
            None => key.qualified_name(),
        };

        for pattern in registry.conventions() {
            let candidate = naming::apply_pattern(&name, pattern);
            match registry.catalog.by_name(&candidate) {
                Some(component) if component.info().serves(key) => return Some(component.clone()),
                Some(_) => warn!(
                    container = %self.inner.name,
                    requested = %key,
                    candidate = %candidate,
                    "Convention candidate cannot serve the requested type"
                ),
                None => debug!(
                    container = %self.inner.name,
                    requested = %key,
                    candidate = %candidate,
                    "No component for convention candidate"
                ),
            }
        }
        None
    }

    /// Snapshot of every cached definition, ordered by requested type name.
    pub fn definitions(&self) -> Vec<DefinitionInfo> {
        let mut infos: Vec<DefinitionInfo> =
            self.inner.definitions.read().values().map(|d| d.info()).collect();
        infos.sort_by(|a, b| a.requested.display_name().cmp(b.requested.display_name()));
        infos
    }

    /// Writes one line per cached definition.
    pub fn write_definitions<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for info in self.definitions() {
            writeln!(out, "{}", info)?;
        }
        Ok(())
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let registry = &self.inner.registry;
        let mut s = String::new();
        s.push_str(&format!("=== Container Debug: {} ===\n", self.inner.name));

        let mut implementations: Vec<String> = registry
            .implementations
            .iter()
            .map(|(k, b)| format!("  {} -> {}\n", k, binding_name(b)))
            .collect();
        implementations.sort();
        s.push_str("Implementations:\n");
        implementations.iter().for_each(|line| s.push_str(line));

        let mut providers: Vec<String> = registry
            .providers
            .iter()
            .map(|(k, b)| format!("  {} -> {}\n", k, binding_name(b)))
            .collect();
        providers.sort();
        s.push_str("Providers:\n");
        providers.iter().for_each(|line| s.push_str(line));

        s.push_str("Conventions:\n");
        for pattern in registry.conventions() {
            s.push_str(&format!("  {}\n", pattern));
        }
        s.push_str(&format!("Interceptor providers: {}\n", self.inner.interceptors.len()));
        s.push_str(&format!("Catalogued components: {}\n", registry.catalog.len()));

        s.push_str("Definitions:\n");
        for info in self.definitions() {
            s.push_str(&format!("  {}\n", info));
        }
        s
    }
}

fn parts_of(requested: TypeKey, source: Source, binding: &Binding) -> DefinitionParts {
    match binding {
        Binding::Implementation(component) => DefinitionParts {
            requested,
            source,
            component: component.clone(),
            provider: None,
        },
        Binding::Provider { component, provider } => DefinitionParts {
            requested,
            source,
            component: component.clone(),
            provider: Some(provider.clone()),
        },
    }
}

#[cfg(feature = "diagnostics")]
fn binding_name(binding: &Binding) -> String {
    match binding {
        Binding::Implementation(component) => component.info().name().to_string(),
        Binding::Provider { component, provider } => {
            format!("{} (provider {})", component.info().name(), provider.type_name())
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.inner.name)
            .field("definitions", &self.inner.definitions.read().len())
            .finish_non_exhaustive()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &TypeKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        let mut chain = ResolutionChain::new();
        self.resolve_key(key, &mut chain)
    }
}

impl Resolver for Container {}
