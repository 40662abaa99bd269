//! Fields populated after construction.

use std::sync::Arc;

use crate::error::{BoxError, DiError};
use crate::key::TypeKey;
use crate::markers;
use crate::registration::{unerase, AnyArc};

type Setter<C> = Arc<dyn Fn(&mut C, AnyArc) -> Result<(), BoxError> + Send + Sync>;

/// A field declared by a component, with the setter that assigns it.
///
/// Only fields carrying the inject marker are populated by the container.
/// They are assigned in declaration order, after the constructor (or
/// provider) has produced the value.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Field;
/// use std::sync::Arc;
///
/// trait Audit: Send + Sync {}
/// struct Billing { audit: Option<Arc<dyn Audit>> }
///
/// let field = Field::new::<dyn Audit>("audit", |b: &mut Billing, a| b.audit = Some(a)).inject();
/// assert!(field.is_inject());
/// assert_eq!(field.name(), "audit");
/// ```
pub struct Field<C> {
    name: &'static str,
    key: TypeKey,
    tags: Vec<&'static str>,
    pub(crate) setter: Setter<C>,
}

impl<C: 'static> Field<C> {
    /// Declares a field of type `Arc<T>` assigned by `setter`.
    pub fn new<T>(name: &'static str, setter: impl Fn(&mut C, Arc<T>) + Send + Sync + 'static) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::try_new::<T>(name, move |c, value| {
            setter(c, value);
            Ok(())
        })
    }

    /// Declares a field whose setter can refuse the value.
    pub fn try_new<T>(
        name: &'static str,
        setter: impl Fn(&mut C, Arc<T>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let setter = move |c: &mut C, value: AnyArc| -> Result<(), BoxError> {
            let typed = unerase::<T>(&value)
                .ok_or_else(|| Box::new(DiError::TypeMismatch(std::any::type_name::<T>())) as BoxError)?;
            setter(c, typed)
        };
        Self {
            name,
            key: TypeKey::of::<T>(),
            tags: Vec::new(),
            setter: Arc::new(setter),
        }
    }

    /// Adds the inject marker.
    pub fn inject(self) -> Self {
        self.tag(markers::INJECT)
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }
}

impl<C> Field<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the field.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn is_inject(&self) -> bool {
        markers::has_inject(&self.tags)
    }
}
