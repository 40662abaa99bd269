#![no_main]

use ferrous_injector::{Component, ComponentType, Constructor, ContainerBuilder, DiError, Resolver};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

trait Greeter: Send + Sync {}

struct English;

impl Greeter for English {}

impl Component for English {
    fn component_type() -> ComponentType<Self> {
        ComponentType::new()
            .named("convention_resolution.impl.GreeterImpl")
            .constructor(Constructor::new(|| English))
            .implements::<dyn Greeter>(|g| g as Arc<dyn Greeter>)
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut builder = ContainerBuilder::new();
    builder.component::<English>();
    for pattern in text.split('\n').take(8) {
        builder.define_convention(pattern);
    }

    // Resolution either finds the component or reports it as unresolvable
    match builder.build().get_instance::<dyn Greeter>() {
        Ok(_) | Err(DiError::Unresolvable(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
    }
});
