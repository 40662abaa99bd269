//! Declared constructors and the argument list handed to them.

use std::sync::Arc;
use thiserror::Error;

use crate::error::BoxError;
use crate::key::TypeKey;
use crate::markers;
use crate::registration::{unerase, AnyArc};

type ConstructorBody<C> = Arc<dyn Fn(&mut Arguments) -> Result<C, BoxError> + Send + Sync>;

/// A constructor declared by a component.
///
/// Constructors list the types of their parameters in declaration order. The
/// container resolves each parameter before invoking the body, which reads
/// the resolved values back with [`Arguments::next`].
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Constructor;
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// struct Scheduler { clock: Option<Arc<dyn Clock>> }
///
/// // zero-argument
/// let default = Constructor::new(|| Scheduler { clock: None });
///
/// // one parameter, selected among several by its inject marker
/// let with_clock = Constructor::with_args(|args| Ok(Scheduler { clock: Some(args.next::<dyn Clock>()?) }))
///     .param::<dyn Clock>()
///     .inject();
///
/// assert_eq!(default.arity(), 0);
/// assert_eq!(with_clock.arity(), 1);
/// assert!(with_clock.is_inject());
/// ```
pub struct Constructor<C> {
    params: Vec<TypeKey>,
    tags: Vec<&'static str>,
    public: bool,
    pub(crate) body: ConstructorBody<C>,
}

impl<C: 'static> Constructor<C> {
    /// Zero-argument constructor.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self::with_args(move |_| Ok(f()))
    }

    /// Fallible zero-argument constructor.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        Self::with_args(move |_| f())
    }

    /// Constructor reading its parameters from [`Arguments`]. Declare the
    /// parameter types with [`param`](Self::param), in the order the body
    /// reads them.
    pub fn with_args<F>(body: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<C, BoxError> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            tags: Vec::new(),
            public: true,
            body: Arc::new(body),
        }
    }

    /// Appends a parameter of type `T`.
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(TypeKey::of::<T>());
        self
    }

    /// Adds the inject marker.
    pub fn inject(self) -> Self {
        self.tag(markers::INJECT)
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }

    /// Hides the constructor from selection.
    pub fn non_public(mut self) -> Self {
        self.public = false;
        self
    }
}

impl<C> Constructor<C> {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    pub fn is_inject(&self) -> bool {
        markers::has_inject(&self.tags)
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub(crate) fn info(&self) -> ConstructorInfo {
        ConstructorInfo {
            arity: self.arity(),
            inject: self.is_inject(),
            public: self.public,
        }
    }
}

/// The parts of a constructor that drive constructor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub arity: usize,
    pub inject: bool,
    pub public: bool,
}

/// Error raised when a constructor body reads its arguments differently from
/// the way it declared them.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("constructor read argument #{index} but only {declared} were declared")]
    Exhausted { index: usize, declared: usize },
    #[error("argument #{index} was declared as {declared} but read as {requested}")]
    Mismatch {
        index: usize,
        declared: &'static str,
        requested: &'static str,
    },
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    values: Vec<(TypeKey, AnyArc)>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<(TypeKey, AnyArc)>) -> Self {
        Self { values, position: 0 }
    }

    /// Takes the next argument as an `Arc<T>`.
    ///
    /// `T` must match the type declared for this position.
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, ArgumentError> {
        let index = self.position;
        let (declared, value) = self.values.get(index).ok_or(ArgumentError::Exhausted {
            index,
            declared: self.values.len(),
        })?;
        let requested = TypeKey::of::<T>();
        let mismatch = ArgumentError::Mismatch {
            index,
            declared: declared.display_name(),
            requested: requested.display_name(),
        };
        if *declared != requested {
            return Err(mismatch);
        }
        let arc = unerase::<T>(value).ok_or(mismatch)?;
        self.position += 1;
        Ok(arc)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }
}
