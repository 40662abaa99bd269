use ferrous_injector::{
    ArgumentError, Arguments, BoxError, Component, ComponentType, Constructor, ContainerBuilder, DiError, Resolver,
};
use std::sync::Arc;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

impl Component for FixedClock {
    fn component_type() -> ComponentType<Self> {
        ComponentType::new()
            .constructor(Constructor::new(|| FixedClock))
            .implements::<dyn Clock>(|c| c as Arc<dyn Clock>)
    }
}

fn with_clock() -> ContainerBuilder {
    let mut builder = ContainerBuilder::new();
    builder.define_implementation::<dyn Clock, FixedClock>().unwrap();
    builder
}

struct Scheduler {
    started_at: Option<u64>,
}

impl Component for Scheduler {
    fn component_type() -> ComponentType<Self> {
        ComponentType::new().constructor(
            Constructor::with_args(|args| {
                Ok(Scheduler { started_at: Some(args.next::<dyn Clock>()?.now()) })
            })
            .param::<dyn Clock>(),
        )
    }
}

#[test]
fn test_single_public_constructor_used_regardless_of_arity() {
    let mut builder = with_clock();
    builder.component::<Scheduler>();
    let scheduler = builder.build().get_required::<Scheduler>();
    assert_eq!(scheduler.started_at, Some(42));
}

#[test]
fn test_inject_marked_constructor_wins() {
    struct Reporter {
        stamp: u64,
    }

    impl Component for Reporter {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new()
                .constructor(Constructor::new(|| Reporter { stamp: 0 }))
                .constructor(
                    Constructor::with_args(|args| Ok(Reporter { stamp: args.next::<dyn Clock>()?.now() }))
                        .param::<dyn Clock>()
                        .tag("javax.inject.Inject"),
                )
        }
    }

    let mut builder = with_clock();
    builder.component::<Reporter>();
    let container = builder.build();
    assert_eq!(container.get_required::<Reporter>().stamp, 42);
    let reporter = container
        .definitions()
        .into_iter()
        .find(|d| d.implementation.ends_with("Reporter"))
        .unwrap();
    assert_eq!(reporter.constructor, Some(1));
}

#[test]
fn test_zero_argument_constructor_without_markers() {
    struct Reporter {
        stamp: u64,
    }

    impl Component for Reporter {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new()
                .constructor(
                    Constructor::with_args(|args| Ok(Reporter { stamp: args.next::<dyn Clock>()?.now() }))
                        .param::<dyn Clock>(),
                )
                .constructor(Constructor::new(|| Reporter { stamp: 7 }))
        }
    }

    let mut builder = with_clock();
    builder.component::<Reporter>();
    assert_eq!(builder.build().get_required::<Reporter>().stamp, 7);
}

#[test]
fn test_non_public_constructors_ignored() {
    struct Sealed;

    impl Component for Sealed {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new().constructor(Constructor::new(|| Sealed).non_public())
        }
    }

    let mut builder = ContainerBuilder::new();
    builder.component::<Sealed>();
    let err = builder.build().get_instance::<Sealed>().err().unwrap();
    assert!(matches!(err, DiError::NoConstructor(name) if name.ends_with("Sealed")));
}

#[test]
fn test_several_marked_constructors_are_ambiguous() {
    struct Twice;

    impl Component for Twice {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new()
                .constructor(Constructor::new(|| Twice).inject())
                .constructor(
                    Constructor::with_args(|args| {
                        let _ = args.next::<dyn Clock>()?;
                        Ok(Twice)
                    })
                    .param::<dyn Clock>()
                    .inject(),
                )
        }
    }

    let mut builder = with_clock();
    builder.component::<Twice>();
    match builder.build().get_instance::<Twice>() {
        Err(DiError::AmbiguousConstructor { reason, .. }) => {
            assert_eq!(reason, "2 constructors marked for injection")
        }
        other => panic!("expected AmbiguousConstructor, got {:?}", other.err()),
    }
}

#[test]
fn test_no_default_constructor_is_ambiguous() {
    struct Pair;

    impl Component for Pair {
        fn component_type() -> ComponentType<Self> {
            let one = |args: &mut Arguments| -> Result<Pair, BoxError> {
                let _ = args.next::<dyn Clock>()?;
                Ok(Pair)
            };
            ComponentType::new()
                .constructor(Constructor::with_args(one).param::<dyn Clock>())
                .constructor(Constructor::with_args(one).param::<dyn Clock>())
        }
    }

    let mut builder = with_clock();
    builder.component::<Pair>();
    let err = builder.build().get_instance::<Pair>().err().unwrap();
    assert!(matches!(err, DiError::AmbiguousConstructor { .. }));
}

#[test]
fn test_failing_constructor_keeps_cause() {
    struct Broken;

    impl Component for Broken {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new().constructor(Constructor::try_new(|| Err("disk full".into())))
        }
    }

    let mut builder = ContainerBuilder::new();
    builder.component::<Broken>();
    let err = builder.build().get_instance::<Broken>().err().unwrap();
    assert!(err.to_string().starts_with("Cannot create instance of "));
    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(cause.to_string(), "disk full");
}

#[test]
fn test_misread_argument_is_construction_error() {
    struct Confused;

    impl Component for Confused {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new().constructor(
                Constructor::with_args(|args| {
                    // declared a Clock, reads a String
                    let _ = args.next::<String>()?;
                    Ok(Confused)
                })
                .param::<dyn Clock>(),
            )
        }
    }

    let mut builder = with_clock();
    builder.component::<Confused>();
    match builder.build().get_instance::<Confused>() {
        Err(DiError::Construction { source, .. }) => {
            let argument = source.downcast_ref::<ArgumentError>().unwrap();
            assert!(matches!(argument, ArgumentError::Mismatch { index: 0, .. }));
        }
        other => panic!("expected Construction, got {:?}", other.err()),
    }
}

#[test]
fn test_unresolvable_parameter_propagates() {
    struct Lonely;

    impl Component for Lonely {
        fn component_type() -> ComponentType<Self> {
            ComponentType::new().constructor(
                Constructor::with_args(|args| {
                    let _ = args.next::<dyn Clock>()?;
                    Ok(Lonely)
                })
                .param::<dyn Clock>(),
            )
        }
    }

    let mut builder = ContainerBuilder::new();
    builder.component::<Lonely>();
    let err = builder.build().get_instance::<Lonely>().err().unwrap();
    assert!(matches!(err, DiError::Unresolvable(name) if name.ends_with("Clock")));
}
