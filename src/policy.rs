//! Singleton policies.
//!
//! Whether a definition is shared is decided once per definition by a single
//! pluggable decision point. The default looks for a singleton marker tag;
//! the alternatives below cover marker interfaces, named boolean constants
//! and arbitrary predicates.

use std::fmt;
use std::sync::Arc;

use crate::component::ComponentInfo;
use crate::key::TypeKey;
use crate::markers;

/// Decides whether instances of a component are shared.
pub trait SingletonPolicy: Send + Sync {
    fn is_singleton(&self, component: &ComponentInfo) -> bool;
}

/// Singleton iff the component carries a singleton marker tag.
///
/// With [`exact`](Self::exact) only one specific tag counts.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{MarkerTagPolicy, ContainerBuilder};
///
/// let mut builder = ContainerBuilder::new();
/// builder.singleton_policy(MarkerTagPolicy::exact("app.Shared"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkerTagPolicy {
    exact: Option<&'static str>,
}

impl MarkerTagPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(tag: &'static str) -> Self {
        Self { exact: Some(tag) }
    }
}

impl SingletonPolicy for MarkerTagPolicy {
    fn is_singleton(&self, component: &ComponentInfo) -> bool {
        match self.exact {
            Some(tag) => component.has_tag(tag),
            None => component.has_marker(markers::SINGLETON),
        }
    }
}

/// Singleton iff the component implements a marker interface.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInterfacePolicy {
    marker: TypeKey,
}

impl MarkerInterfacePolicy {
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            marker: TypeKey::of::<I>(),
        }
    }
}

impl SingletonPolicy for MarkerInterfacePolicy {
    fn is_singleton(&self, component: &ComponentInfo) -> bool {
        component.interfaces().contains(&self.marker)
    }
}

/// Singleton iff the component declares a boolean constant with the given
/// name set to `true`.
#[derive(Debug, Clone, Copy)]
pub struct StaticFlagPolicy {
    name: &'static str,
}

impl StaticFlagPolicy {
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl SingletonPolicy for StaticFlagPolicy {
    fn is_singleton(&self, component: &ComponentInfo) -> bool {
        component.flag(self.name).unwrap_or(false)
    }
}

/// Singleton iff the predicate says so.
#[derive(Clone)]
pub struct FnPolicy {
    predicate: Arc<dyn Fn(&ComponentInfo) -> bool + Send + Sync>,
}

impl FnPolicy {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&ComponentInfo) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for FnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy").finish_non_exhaustive()
    }
}

impl SingletonPolicy for FnPolicy {
    fn is_singleton(&self, component: &ComponentInfo) -> bool {
        (self.predicate)(component)
    }
}
