//! Component definitions: how one requested type is produced.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use super::context::ResolutionContext;
use crate::component::{ComponentInfo, ConstructorInfo, ErasedComponent, ErasedProvider, Strategy};
use crate::error::{DiError, DiResult};
use crate::interception::{ErasedProxy, Interception, InterceptorProvider, Target};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::registration::AnyArc;

/// Where a definition's component comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Explicit implementation binding
    Implementation,
    /// Explicit provider binding
    Provider,
    /// Naming convention match
    Convention,
    /// The requested concrete type itself
    SelfBound,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Implementation => "implementation",
            Source::Provider => "provider",
            Source::Convention => "convention",
            Source::SelfBound => "self",
        };
        f.write_str(s)
    }
}

/// Picks the constructor to use among the declared ones.
///
/// A single public constructor is used whatever its arity. With several, the
/// one carrying the inject marker wins; without any marker the zero-argument
/// constructor is used.
pub(crate) fn select_constructor(component: &'static str, ctors: &[ConstructorInfo]) -> DiResult<usize> {
    let public: Vec<usize> = (0..ctors.len()).filter(|&i| ctors[i].public).collect();
    match public.as_slice() {
        [] => return Err(DiError::NoConstructor(component)),
        [only] => return Ok(*only),
        _ => {}
    }

    let marked: Vec<usize> = public.iter().copied().filter(|&i| ctors[i].inject).collect();
    match marked.as_slice() {
        [only] => Ok(*only),
        [] => {
            let defaults: Vec<usize> = public.iter().copied().filter(|&i| ctors[i].arity == 0).collect();
            match defaults.as_slice() {
                [only] => Ok(*only),
                [] => Err(DiError::AmbiguousConstructor {
                    component,
                    reason: format!(
                        "{} public constructors, none marked for injection and no zero-argument constructor",
                        public.len()
                    ),
                }),
                _ => Err(DiError::AmbiguousConstructor {
                    component,
                    reason: "several zero-argument constructors".to_string(),
                }),
            }
        }
        _ => Err(DiError::AmbiguousConstructor {
            component,
            reason: format!("{} constructors marked for injection", marked.len()),
        }),
    }
}

/// Everything needed to produce instances of one requested type.
///
/// Built once per requested key and cached for the life of the container.
pub(crate) struct ComponentDefinition {
    requested: TypeKey,
    source: Source,
    component: Arc<dyn ErasedComponent>,
    strategy: Strategy,
    lifetime: Lifetime,
    proxy: Option<ProxySetup>,
    slot: OnceCell<AnyArc>,
}

struct ProxySetup {
    factory: Arc<dyn ErasedProxy>,
    providers: Arc<[Arc<dyn InterceptorProvider>]>,
    info: Arc<ComponentInfo>,
}

pub(crate) struct DefinitionParts {
    pub(crate) requested: TypeKey,
    pub(crate) source: Source,
    pub(crate) component: Arc<dyn ErasedComponent>,
    pub(crate) provider: Option<Arc<dyn ErasedProvider>>,
}

impl ComponentDefinition {
    pub(crate) fn new(
        parts: DefinitionParts,
        singleton: bool,
        proxy: Option<Arc<dyn ErasedProxy>>,
        interceptors: &Arc<[Arc<dyn InterceptorProvider>]>,
    ) -> DiResult<Self> {
        let DefinitionParts {
            requested,
            source,
            component,
            provider,
        } = parts;

        let (strategy, lifetime) = match provider {
            // the provider owns sharing
            Some(provider) => {
                trace!(requested = %requested, provider = provider.type_name(), "Provider strategy");
                (Strategy::Provider(provider), Lifetime::Transient)
            }
            None => {
                let index = select_constructor(
                    component.info().key().display_name(),
                    &component.constructor_infos(),
                )?;
                (Strategy::Constructor(index), Lifetime::from_singleton_flag(singleton))
            }
        };

        let proxy = if requested.is_interface() && !interceptors.is_empty() {
            let factory = proxy.ok_or_else(|| {
                DiError::Configuration(format!(
                    "interceptors are registered but no proxy is defined for {}",
                    requested
                ))
            })?;
            Some(ProxySetup {
                factory,
                providers: interceptors.clone(),
                info: Arc::new(component.info().clone()),
            })
        } else {
            None
        };

        debug!(
            requested = %requested,
            component = %component.info().name(),
            source = %source,
            lifetime = %lifetime,
            proxied = proxy.is_some(),
            "Created component definition"
        );

        Ok(Self {
            requested,
            source,
            component,
            strategy,
            lifetime,
            proxy,
            slot: OnceCell::new(),
        })
    }

    /// Returns the shared instance or a new one, per the lifetime.
    pub(crate) fn get_instance(&self, ctx: &mut ResolutionContext<'_>) -> DiResult<AnyArc> {
        match self.lifetime {
            Lifetime::Singleton => {
                if let Some(existing) = self.slot.get() {
                    return Ok(existing.clone());
                }
                let _claim = ctx.claim_singleton(self.requested)?;
                // built by the previous owner while we waited
                if let Some(existing) = self.slot.get() {
                    return Ok(existing.clone());
                }
                let created = self.create(ctx)?;
                Ok(self.slot.get_or_init(|| created).clone())
            }
            Lifetime::Transient => self.create(ctx),
        }
    }

    fn create(&self, ctx: &mut ResolutionContext<'_>) -> DiResult<AnyArc> {
        let raw = self.component.instantiate(&self.strategy, ctx)?;
        let mismatch = || DiError::TypeMismatch(self.requested.display_name());
        let typed = self.component.cast(&raw, &self.requested).ok_or_else(mismatch)?;

        match &self.proxy {
            Some(setup) => {
                let target = Target::new(setup.info.clone(), raw.clone());
                let interception = Interception::new(self.requested, target, setup.providers.clone());
                setup.factory.wrap(&typed, interception).ok_or_else(mismatch)
            }
            None => Ok(typed),
        }
    }

    pub(crate) fn info(&self) -> DefinitionInfo {
        let component = self.component.info();
        DefinitionInfo {
            requested: self.requested,
            implementation: component.name().to_string(),
            source: self.source,
            lifetime: self.lifetime,
            proxied: self.proxy.is_some(),
            constructor: match &self.strategy {
                Strategy::Constructor(index) => Some(*index),
                Strategy::Provider(_) => None,
            },
            fields: self
                .component
                .injected_fields()
                .into_iter()
                .map(|(name, _)| name)
                .collect(),
            created: self.slot.get().is_some(),
        }
    }
}

/// Snapshot of a cached definition, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionInfo {
    /// The requested type the definition is cached under
    pub requested: TypeKey,
    /// Qualified name of the implementation
    pub implementation: String,
    pub source: Source,
    pub lifetime: Lifetime,
    /// Instances are wrapped in an interception proxy
    pub proxied: bool,
    /// Index of the selected constructor; `None` for providers
    pub constructor: Option<usize>,
    /// Names of the injected fields, in injection order
    pub fields: Vec<&'static str>,
    /// A singleton instance exists
    pub created: bool,
}

impl fmt::Display for DefinitionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}, {}",
            self.requested, self.implementation, self.source, self.lifetime
        )?;
        if self.proxied {
            f.write_str(", proxied")?;
        }
        if !self.fields.is_empty() {
            write!(f, ", fields: {}", self.fields.join(", "))?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctor(arity: usize, inject: bool) -> ConstructorInfo {
        ConstructorInfo { arity, inject, public: true }
    }

    #[test]
    fn test_single_public_constructor_wins() {
        assert_eq!(select_constructor("C", &[ctor(3, false)]).unwrap(), 0);

        let hidden = ConstructorInfo { arity: 0, inject: true, public: false };
        assert_eq!(select_constructor("C", &[hidden, ctor(2, false)]).unwrap(), 1);
    }

    #[test]
    fn test_no_public_constructor() {
        let hidden = ConstructorInfo { arity: 0, inject: false, public: false };
        assert!(matches!(
            select_constructor("C", &[hidden]),
            Err(DiError::NoConstructor("C"))
        ));
        assert!(matches!(select_constructor("C", &[]), Err(DiError::NoConstructor(_))));
    }

    #[test]
    fn test_inject_marker_breaks_tie() {
        let ctors = [ctor(0, false), ctor(1, true), ctor(2, false)];
        assert_eq!(select_constructor("C", &ctors).unwrap(), 1);
    }

    #[test]
    fn test_zero_argument_fallback() {
        let ctors = [ctor(2, false), ctor(0, false)];
        assert_eq!(select_constructor("C", &ctors).unwrap(), 1);
    }

    #[test]
    fn test_ambiguous_cases() {
        let no_default = [ctor(1, false), ctor(2, false)];
        assert!(matches!(
            select_constructor("C", &no_default),
            Err(DiError::AmbiguousConstructor { .. })
        ));

        let two_marked = [ctor(1, true), ctor(2, true)];
        let err = select_constructor("C", &two_marked).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ambiguous constructor for C: 2 constructors marked for injection"
        );
    }

    #[test]
    fn test_definition_info_display() {
        struct Svc;
        let info = DefinitionInfo {
            requested: TypeKey::of::<Svc>(),
            implementation: "app.SvcImpl".to_string(),
            source: Source::Convention,
            lifetime: Lifetime::Singleton,
            proxied: true,
            constructor: Some(0),
            fields: vec!["clock", "audit"],
            created: false,
        };
        let shown = info.to_string();
        assert!(shown.ends_with("-> app.SvcImpl [convention, singleton, proxied, fields: clock, audit]"));
    }
}
