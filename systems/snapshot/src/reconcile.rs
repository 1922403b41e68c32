//! Merging of live-scanned objects with objects known from static level data.

use waypoint_core::Object;

/// Appends statically known objects that the live scan did not report.
///
/// Live entries keep their order and are never removed. A static object is
/// appended only when no object with the same name is already present in the
/// merged list, so the first static object of a name wins over later ones.
#[must_use]
pub fn reconcile_objects(mut live: Vec<Object>, known: &[Object]) -> Vec<Object> {
    for object in known {
        if !live.iter().any(|existing| existing.name == object.name) {
            live.push(*object);
        }
    }
    live
}
