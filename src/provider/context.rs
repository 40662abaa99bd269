//! Resolution context for dependency injection.
//!
//! This module contains the ResolutionContext type which the instantiation
//! code uses to resolve constructor parameters and injected fields.

use super::Container;
use crate::component::DependencyResolver;
use crate::error::DiResult;
use crate::internal::{InitClaim, ResolutionChain};
use crate::key::TypeKey;
use crate::registration::AnyArc;

/// Resolves dependencies through the container on the current call path.
///
/// The context carries the chain of keys being resolved, so a dependency that
/// leads back to one of them is reported as circular instead of recursing.
pub(crate) struct ResolutionContext<'a> {
    container: &'a Container,
    chain: &'a mut ResolutionChain,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(container: &'a Container, chain: &'a mut ResolutionChain) -> Self {
        Self { container, chain }
    }

    /// Claims construction of the singleton for `key` on this chain.
    pub(crate) fn claim_singleton(&self, key: TypeKey) -> DiResult<InitClaim<'a>> {
        let container: &'a Container = self.container;
        container.singletons_in_progress().claim(key, &*self.chain)
    }
}

impl DependencyResolver for ResolutionContext<'_> {
    fn resolve_dependency(&mut self, key: &TypeKey) -> DiResult<AnyArc> {
        self.container.resolve_key(key, self.chain)
    }
}
