//! Component key types for the dependency injection container.

use std::any::TypeId;
use std::fmt;

/// Shape of a requested type.
///
/// Trait objects (`dyn Trait`) are interface-shaped: they can only be served by
/// an implementation chosen through a binding, a provider or a naming
/// convention, and they are the only types the interception layer wraps.
/// Everything else is concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A `dyn Trait` type
    Interface,
    /// A sized, constructible type
    Concrete,
}

/// Identity of a requested type, used as the definition cache key.
///
/// Keys compare and hash by `TypeId` only; the type name is carried for
/// diagnostics and for the naming conventions.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{TypeKey, Shape};
///
/// trait Greeter: Send + Sync {}
/// struct GreeterImpl;
///
/// let iface = TypeKey::of::<dyn Greeter>();
/// let concrete = TypeKey::of::<GreeterImpl>();
///
/// assert_eq!(iface.shape(), Shape::Interface);
/// assert_eq!(concrete.shape(), Shape::Concrete);
/// assert_ne!(iface, concrete);
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    shape: Shape,
}

impl TypeKey {
    /// Key for `T`, which may be a trait object.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = std::any::type_name::<T>();
        let shape = if name.starts_with("dyn ") {
            Shape::Interface
        } else {
            Shape::Concrete
        };
        Self {
            id: TypeId::of::<T>(),
            name,
            shape,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The `std::any::type_name` of the keyed type.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_interface(&self) -> bool {
        self.shape == Shape::Interface
    }

    /// Dot-delimited name used by the naming conventions.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::from_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A namespace plus a simple name, both dot-delimited.
///
/// Rust paths (`app::services::Greeter`) are mapped onto the dotted form
/// (`app.services` + `Greeter`) so that convention patterns read the same for
/// every component regardless of how the type was spelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    namespace: String,
    simple: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, simple: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            simple: simple.into(),
        }
    }

    /// Parses a dotted name such as `a.b.X`. A name without dots has an empty
    /// namespace.
    pub fn parse(dotted: &str) -> Self {
        let dotted = dotted.trim();
        match dotted.rfind('.') {
            Some(i) => Self::new(&dotted[..i], &dotted[i + 1..]),
            None => Self::new("", dotted),
        }
    }

    /// Derives a name from `std::any::type_name` output.
    ///
    /// `dyn` prefixes, additional trait-object bounds and generic arguments are
    /// dropped, and `::` separators become dots.
    pub fn from_type_name(type_name: &str) -> Self {
        let mut path = type_name.trim();
        if let Some(rest) = path.strip_prefix("dyn ") {
            path = rest;
        }
        if let Some(i) = path.find(" + ") {
            path = &path[..i];
        }
        if let Some(i) = path.find('<') {
            path = &path[..i];
        }
        Self::parse(&path.replace("::", "."))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn simple_name(&self) -> &str {
        &self.simple
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.simple)
        } else {
            write!(f, "{}.{}", self.namespace, self.simple)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Marker: Send + Sync {}
    struct Plain;
    struct Wrapper<T>(T);

    #[test]
    fn test_shape_detection() {
        assert_eq!(TypeKey::of::<dyn Marker>().shape(), Shape::Interface);
        assert_eq!(TypeKey::of::<dyn Marker + Send>().shape(), Shape::Interface);
        assert_eq!(TypeKey::of::<Plain>().shape(), Shape::Concrete);
        assert_eq!(TypeKey::of::<String>().shape(), Shape::Concrete);
    }

    #[test]
    fn test_qualified_name_from_type_names() {
        let name = TypeKey::of::<dyn Marker>().qualified_name();
        assert_eq!(name.namespace(), "ferrous_injector.key.tests");
        assert_eq!(name.simple_name(), "Marker");

        let generic = TypeKey::of::<Wrapper<Plain>>().qualified_name();
        assert_eq!(generic.simple_name(), "Wrapper");

        let bounded = QualifiedName::from_type_name("dyn a::b::X + core::marker::Send");
        assert_eq!(bounded.to_string(), "a.b.X");
    }

    #[test]
    fn test_parse_without_namespace() {
        let name = QualifiedName::parse("XImpl");
        assert_eq!(name.namespace(), "");
        assert_eq!(name.to_string(), "XImpl");
    }

    #[test]
    fn test_key_equality_ignores_name() {
        let a = TypeKey::of::<Plain>();
        let b = TypeKey::of::<Plain>();
        assert_eq!(a, b);
        assert_ne!(a, TypeKey::of::<String>());
    }
}
