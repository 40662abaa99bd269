//! Marker tags recognised on components, constructors and fields.
//!
//! Tags are plain strings. A tag counts as a given marker when its last path
//! segment (after `.` or `::`) equals the marker name, so `Inject`,
//! `javax.inject.Inject` and `my_app::markers::Inject` are all inject markers.

/// Marker selecting constructors and fields for injection.
pub const INJECT: &str = "Inject";
/// Marker flagging a component as a singleton.
pub const SINGLETON: &str = "Singleton";

/// Returns true if `tag` names the `marker`.
pub fn is_marker(tag: &str, marker: &str) -> bool {
    last_segment(tag) == marker
}

pub fn is_inject(tag: &str) -> bool {
    is_marker(tag, INJECT)
}

pub fn is_singleton(tag: &str) -> bool {
    is_marker(tag, SINGLETON)
}

/// Returns true if any of `tags` is an inject marker.
pub fn has_inject(tags: &[&'static str]) -> bool {
    tags.iter().any(|t| is_inject(t))
}

fn last_segment(tag: &str) -> &str {
    let tag = tag.trim();
    let after_path = tag.rsplit("::").next().unwrap_or(tag);
    after_path.rsplit('.').next().unwrap_or(after_path)
}
