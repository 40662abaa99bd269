//! Component metadata.
//!
//! Rust has no runtime reflection, so each concrete component describes
//! itself once, through [`Component::component_type`]: its name, marker tags,
//! constructors, injectable fields, the interfaces it can be served as, and
//! tags attached to its methods. The container reads this description the
//! way a reflective injector would inspect a class.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{QualifiedName, TypeKey};
use crate::markers;
use crate::registration::{erase, unerase, AnyArc};

pub mod constructor;
pub mod field;

pub use constructor::{ArgumentError, Arguments, Constructor, ConstructorInfo};
pub use field::Field;

/// A concrete type the container can construct.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// struct EnglishGreeter;
///
/// impl Greeter for EnglishGreeter {
///     fn greet(&self, name: &str) -> String {
///         format!("Hello, {}!", name)
///     }
/// }
///
/// impl Component for EnglishGreeter {
///     fn component_type() -> ComponentType<Self> {
///         ComponentType::new()
///             .singleton()
///             .constructor(Constructor::new(|| EnglishGreeter))
///             .implements::<dyn Greeter>(|c| c as Arc<dyn Greeter>)
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.define_implementation::<dyn Greeter, EnglishGreeter>().unwrap();
///
/// let container = builder.build();
/// let greeter = container.get_required::<dyn Greeter>();
/// assert_eq!(greeter.greet("Ada"), "Hello, Ada!");
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Describes the component. Called once when the component is catalogued.
    fn component_type() -> ComponentType<Self>;
}

/// Static facts about a component, shared with singleton policies and
/// interceptor providers.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    key: TypeKey,
    name: QualifiedName,
    tags: Vec<&'static str>,
    flags: Vec<(&'static str, bool)>,
    interfaces: Vec<TypeKey>,
    method_tags: Vec<(&'static str, &'static str)>,
}

impl ComponentInfo {
    fn of<C: 'static>() -> Self {
        let key = TypeKey::of::<C>();
        Self {
            key,
            name: key.qualified_name(),
            tags: Vec::new(),
            flags: Vec::new(),
            interfaces: Vec::new(),
            method_tags: Vec::new(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Name the naming conventions match against.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    /// Returns true if a tag names `marker` (see [`markers::is_marker`]).
    pub fn has_marker(&self, marker: &str) -> bool {
        self.tags.iter().any(|t| markers::is_marker(t, marker))
    }

    /// Returns true if `tag` was declared exactly.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    /// Value of a declared boolean constant.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    /// Returns true if the component can be served as `key`, either because
    /// it is that type or because it declared the interface.
    pub fn serves(&self, key: &TypeKey) -> bool {
        self.key == *key || self.interfaces.contains(key)
    }

    pub fn implements<I: ?Sized + 'static>(&self) -> bool {
        self.interfaces.contains(&TypeKey::of::<I>())
    }

    /// Returns true if the implementation tagged `method` with `tag`.
    pub fn method_has_tag(&self, method: &str, tag: &str) -> bool {
        self.method_tags.iter().any(|(m, t)| *m == method && *t == tag)
    }
}

type Cast = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;

/// The description of a component `C`, assembled with builder methods.
pub struct ComponentType<C> {
    info: ComponentInfo,
    constructors: Vec<Constructor<C>>,
    fields: Vec<Field<C>>,
    casts: Vec<(TypeId, Cast)>,
}

impl<C: Send + Sync + 'static> ComponentType<C> {
    pub fn new() -> Self {
        Self {
            info: ComponentInfo::of::<C>(),
            constructors: Vec::new(),
            fields: Vec::new(),
            casts: Vec::new(),
        }
    }

    /// Overrides the dotted name derived from the Rust path.
    pub fn named(mut self, dotted: &str) -> Self {
        self.info.name = QualifiedName::parse(dotted);
        self
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.info.tags.push(tag);
        self
    }

    /// Adds the singleton marker.
    pub fn singleton(self) -> Self {
        self.tag(markers::SINGLETON)
    }

    /// Declares a named boolean constant, readable by
    /// [`StaticFlagPolicy`](crate::StaticFlagPolicy).
    pub fn flag(mut self, name: &'static str, value: bool) -> Self {
        self.info.flags.push((name, value));
        self
    }

    pub fn constructor(mut self, constructor: Constructor<C>) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn field(mut self, field: Field<C>) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares an inject-marked field of type `Arc<T>`.
    pub fn inject_field<T>(
        self,
        name: &'static str,
        setter: impl Fn(&mut C, Arc<T>) + Send + Sync + 'static,
    ) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.field(Field::new::<T>(name, setter).inject())
    }

    /// Declares that the component can be served as `I`. `cast` performs the
    /// unsizing coercion, usually `|c| c as Arc<dyn I>`.
    pub fn implements<I>(mut self, cast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<I>();
        if !self.info.interfaces.contains(&key) {
            self.info.interfaces.push(key);
        }
        let cast: Cast = Arc::new(move |any: &AnyArc| unerase::<C>(any).map(|c| erase::<I>(cast(c))));
        self.casts.push((key.type_id(), cast));
        self
    }

    /// Tags a method of the implementation, for interceptor providers.
    pub fn method_tag(mut self, method: &'static str, tag: &'static str) -> Self {
        self.info.method_tags.push((method, tag));
        self
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    pub fn constructors(&self) -> &[Constructor<C>] {
        &self.constructors
    }

    pub fn fields(&self) -> &[Field<C>] {
        &self.fields
    }
}

impl<C: Send + Sync + 'static> Default for ComponentType<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// How a definition obtains the raw component value.
#[derive(Clone)]
pub(crate) enum Strategy {
    Constructor(usize),
    Provider(Arc<dyn ErasedProvider>),
}

/// Type-erased provider producing a boxed component value.
pub(crate) trait ErasedProvider: Send + Sync {
    fn produce(&self) -> Result<Box<dyn Any + Send>, crate::error::BoxError>;
    fn type_name(&self) -> &'static str;
}

/// Resolves dependencies on behalf of the instantiation code.
pub(crate) trait DependencyResolver {
    fn resolve_dependency(&mut self, key: &TypeKey) -> DiResult<AnyArc>;
}

/// Type-erased view of a [`ComponentType`], stored in the catalog.
pub(crate) trait ErasedComponent: Send + Sync {
    fn info(&self) -> &ComponentInfo;

    fn constructor_infos(&self) -> Vec<ConstructorInfo>;

    /// Keys of the inject-marked fields, in declaration order.
    fn injected_fields(&self) -> Vec<(&'static str, TypeKey)>;

    /// Produces an `Arc<C>` (erased), with its fields injected.
    fn instantiate(&self, strategy: &Strategy, deps: &mut dyn DependencyResolver) -> DiResult<AnyArc>;

    /// Re-types an erased `Arc<C>` as the requested key.
    fn cast(&self, instance: &AnyArc, target: &TypeKey) -> Option<AnyArc>;
}

impl<C: Send + Sync + 'static> ErasedComponent for ComponentType<C> {
    fn info(&self) -> &ComponentInfo {
        &self.info
    }

    fn constructor_infos(&self) -> Vec<ConstructorInfo> {
        self.constructors.iter().map(Constructor::info).collect()
    }

    fn injected_fields(&self) -> Vec<(&'static str, TypeKey)> {
        self.fields
            .iter()
            .filter(|f| f.is_inject())
            .map(|f| (f.name(), f.key()))
            .collect()
    }

    fn instantiate(&self, strategy: &Strategy, deps: &mut dyn DependencyResolver) -> DiResult<AnyArc> {
        let component = self.info.key.display_name();
        let mut value: C = match strategy {
            Strategy::Provider(provider) => {
                let produced = provider
                    .produce()
                    .map_err(|source| DiError::Construction { component, source })?;
                *produced
                    .downcast::<C>()
                    .map_err(|_| DiError::TypeMismatch(component))?
            }
            Strategy::Constructor(index) => {
                let ctor = self
                    .constructors
                    .get(*index)
                    .ok_or(DiError::NoConstructor(component))?;
                let mut values = Vec::with_capacity(ctor.arity());
                for param in ctor.params() {
                    values.push((*param, deps.resolve_dependency(param)?));
                }
                (ctor.body)(&mut Arguments::new(values))
                    .map_err(|source| DiError::Construction { component, source })?
            }
        };

        for field in self.fields.iter().filter(|f| f.is_inject()) {
            let dependency = deps.resolve_dependency(&field.key())?;
            (field.setter)(&mut value, dependency).map_err(|source| DiError::Injection {
                component,
                field: field.name(),
                source,
            })?;
        }

        Ok(erase(Arc::new(value)))
    }

    fn cast(&self, instance: &AnyArc, target: &TypeKey) -> Option<AnyArc> {
        if *target == self.info.key {
            return Some(instance.clone());
        }
        self.casts
            .iter()
            .find(|(id, _)| *id == target.type_id())
            .and_then(|(_, cast)| cast(instance))
    }
}
