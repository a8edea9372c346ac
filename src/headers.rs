//! Header inheritance.
//!
//! Collection and folder headers are folded into one inherited set, root to
//! leaf, so the nearest scope wins a name collision. The request's own
//! headers are then emitted untouched, and inherited headers only fill the
//! names the request leaves open. Names compare case-insensitively.
//!
//! gRPC requests inherit from the `metadata` list of each defaults block
//! instead of `headers`. A request's own `metadata` entries count as own
//! headers, after its `headers`.

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::hash_map::Entry;

use crate::locate::Lineage;
use crate::model::{Collection, Header};

/// Resolve the effective header list for the located request.
pub fn resolve_headers(collection: &Collection, lineage: &Lineage<'_>) -> Vec<Header> {
    let protocol = lineage.request.protocol;
    let layers = std::iter::once(collection.defaults.inheritable_headers(protocol)).chain(
        lineage
            .ancestors
            .iter()
            .map(|folder| folder.defaults.inheritable_headers(protocol)),
    );
    let inherited = inherited_headers(layers);

    let own: Vec<&Header> = lineage
        .request
        .own_headers()
        .filter(|h| !h.disabled)
        .collect();
    let own_keys: HashSet<String> = own.iter().map(|h| h.key()).collect();

    let mut resolved: Vec<Header> = own.into_iter().cloned().collect();
    for header in inherited {
        if own_keys.contains(&header.key()) {
            continue;
        }
        tracing::trace!(name = %header.name, "inheriting header");
        resolved.push(header.clone());
    }
    resolved
}

/// Fold header layers (outermost first) into one set keyed by lowercased
/// name. A later layer replaces the value but the key keeps the slot of its
/// first appearance. Disabled headers are dropped.
fn inherited_headers<'a>(layers: impl IntoIterator<Item = &'a [Header]>) -> Vec<&'a Header> {
    let mut slots: Vec<&Header> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for header in layers.into_iter().flatten().filter(|h| !h.disabled) {
        match index.entry(header.key()) {
            Entry::Occupied(slot) => slots[*slot.get()] = header,
            Entry::Vacant(slot) => {
                slot.insert(slots.len());
                slots.push(header);
            }
        }
    }
    slots
}
