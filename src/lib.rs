//! # ferrous-injector
//!
//! A dependency injection container that finds implementations by naming
//! convention, builds components through constructor and field injection, and
//! can wrap interface-typed components with call interceptors.
//!
//! ## Features
//!
//! - **Naming conventions**: `dyn app::Greeter` is served by `app::GreeterImpl`
//!   (or `app::impl::GreeterImpl`) without any binding
//! - **Explicit bindings**: implementation and provider bindings take precedence
//! - **Constructor and field injection**: declared once per component
//! - **Singletons and transients**: decided by a pluggable policy, singletons
//!   are built at most once even under concurrent first use
//! - **Circular dependency detection**: fails fast with the dependency path
//! - **Interception**: before/after/error hooks around every call on an interface
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, Resolver};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! // Found through the default "${package}.${class}Impl" convention
//! struct GreeterImpl;
//!
//! impl Greeter for GreeterImpl {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Hello, {}!", name)
//!     }
//! }
//!
//! impl Component for GreeterImpl {
//!     fn component_type() -> ComponentType<Self> {
//!         ComponentType::new()
//!             .singleton()
//!             .constructor(Constructor::new(|| GreeterImpl))
//!             .implements::<dyn Greeter>(|g| g as Arc<dyn Greeter>)
//!     }
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.component::<GreeterImpl>();
//!
//! let container = builder.build();
//! let greeter = container.get_required::<dyn Greeter>();
//! assert_eq!(greeter.greet("Ada"), "Hello, Ada!");
//! ```
//!
//! ## Resolution Order
//!
//! For a type requested for the first time:
//!
//! 1. an explicit implementation binding,
//! 2. an explicit provider binding,
//! 3. each naming convention, in order,
//! 4. the requested type itself, when it is a catalogued concrete component.
//!
//! The outcome is cached per requested type, so requesting `dyn Greeter` and
//! `GreeterImpl` gives two independent definitions.
//!
//! ## Dependencies
//!
//! ```rust
//! use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, Resolver};
//! use std::sync::Arc;
//!
//! trait Repository: Send + Sync {
//!     fn find(&self, id: u32) -> Option<String>;
//! }
//! trait Audit: Send + Sync {
//!     fn record(&self, what: &str);
//! }
//!
//! struct MemoryRepository;
//! impl Repository for MemoryRepository {
//!     fn find(&self, id: u32) -> Option<String> {
//!         (id == 1).then(|| "ada".to_string())
//!     }
//! }
//! impl Component for MemoryRepository {
//!     fn component_type() -> ComponentType<Self> {
//!         ComponentType::new()
//!             .constructor(Constructor::new(|| MemoryRepository))
//!             .implements::<dyn Repository>(|r| r as Arc<dyn Repository>)
//!     }
//! }
//!
//! struct NoAudit;
//! impl Audit for NoAudit {
//!     fn record(&self, _what: &str) {}
//! }
//! impl Component for NoAudit {
//!     fn component_type() -> ComponentType<Self> {
//!         ComponentType::new()
//!             .constructor(Constructor::new(|| NoAudit))
//!             .implements::<dyn Audit>(|a| a as Arc<dyn Audit>)
//!     }
//! }
//!
//! struct UserService {
//!     repository: Arc<dyn Repository>,
//!     audit: Option<Arc<dyn Audit>>,
//! }
//!
//! impl Component for UserService {
//!     fn component_type() -> ComponentType<Self> {
//!         ComponentType::new()
//!             // constructor injection
//!             .constructor(
//!                 Constructor::with_args(|args| {
//!                     Ok(UserService { repository: args.next::<dyn Repository>()?, audit: None })
//!                 })
//!                 .param::<dyn Repository>(),
//!             )
//!             // field injection, after construction
//!             .inject_field::<dyn Audit>("audit", |s: &mut UserService, a| s.audit = Some(a))
//!     }
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder
//!     .define_implementation::<dyn Repository, MemoryRepository>().unwrap()
//!     .define_implementation::<dyn Audit, NoAudit>().unwrap()
//!     .component::<UserService>();
//!
//! let service = builder.build().get_required::<UserService>();
//! assert_eq!(service.repository.find(1).as_deref(), Some("ada"));
//! assert!(service.audit.is_some());
//! ```

// Module declarations
pub mod collection;
pub mod component;
pub mod config;
pub mod error;
pub mod interception;
pub mod key;
pub mod lifetime;
pub mod markers;
pub mod naming;
pub mod policy;
pub mod provider;
pub mod traits;

// Internal modules
mod internal;
mod registration;

pub use collection::ContainerBuilder;
pub use component::{
    ArgumentError, Arguments, Component, ComponentInfo, ComponentType, Constructor, ConstructorInfo,
    Field,
};
pub use config::ContainerSettings;
pub use error::{BoxError, DiError, DiResult};
pub use interception::{
    annotation_exists, CallPanicked, FnInterceptorProvider, Interception, Interceptor,
    InterceptorProvider, InterfaceProxy, MethodDescriptor, Target,
};
pub use key::{QualifiedName, Shape, TypeKey};
pub use lifetime::Lifetime;
pub use policy::{FnPolicy, MarkerInterfacePolicy, MarkerTagPolicy, SingletonPolicy, StaticFlagPolicy};
pub use provider::{Container, DefinitionInfo, Source};
pub use registration::Provider;
pub use traits::{Resolver, ResolverCore};
