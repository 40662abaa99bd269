#![no_main]

use ferrous_injector::naming::{apply_pattern, cut_last_level, package_level};
use ferrous_injector::QualifiedName;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // "<dotted name>\n<pattern>"
    let (dotted, pattern) = text.split_once('\n').unwrap_or((text, "${package}.${class}Impl"));
    let name = QualifiedName::parse(dotted);

    let candidate = apply_pattern(&name, pattern);
    let _ = package_level(pattern);

    // A pattern without tokens expands to itself, minus one leading dot
    if !pattern.contains("${") {
        assert_eq!(candidate, pattern.strip_prefix('.').unwrap_or(pattern));
    }

    let namespace = name.namespace();
    assert!(namespace.starts_with(cut_last_level(namespace)));
});
