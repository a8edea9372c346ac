//! Script composition across scopes.
//!
//! Each scope's script list is first folded into a [`ScriptSet`], one slot per
//! [`ScriptKind`]. Slots are then combined according to the [`ScriptFlow`]:
//!
//! ```text
//! sandwich     pre-request    collection → folder₁ … folderₙ → request
//!              post-response  request → folderₙ … folder₁ → collection
//!              tests          collection → folder₁ … folderₙ → request
//!
//! sequential   every kind     nearest scope that defines it
//! ```
//!
//! `hooks` takes no part in either flow: the request's own hooks are passed
//! through as declared.

use crate::locate::Lineage;
use crate::model::{Collection, Script, ScriptKind};
use crate::types::ScriptFlow;

/// Separator placed between the parts of a composed script.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// The scripts of a single scope, one optional slot per kind.
///
/// Empty code is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSet {
    pub pre_request: Option<String>,
    pub post_response: Option<String>,
    pub tests: Option<String>,
    pub hooks: Option<String>,
}

impl ScriptSet {
    /// Fold a script list into slots. If a kind appears twice, the later
    /// entry wins.
    pub fn from_scripts(scripts: &[Script]) -> Self {
        let mut set = Self::default();
        for script in scripts.iter().filter(|s| !s.code.is_empty()) {
            *set.slot_mut(script.kind) = Some(script.code.clone());
        }
        set
    }

    pub fn get(&self, kind: ScriptKind) -> Option<&str> {
        match kind {
            ScriptKind::PreRequest => self.pre_request.as_deref(),
            ScriptKind::PostResponse => self.post_response.as_deref(),
            ScriptKind::Tests => self.tests.as_deref(),
            ScriptKind::Hooks => self.hooks.as_deref(),
        }
    }

    pub fn set(&mut self, kind: ScriptKind, code: Option<String>) {
        *self.slot_mut(kind) = code.filter(|c| !c.is_empty());
    }

    fn slot_mut(&mut self, kind: ScriptKind) -> &mut Option<String> {
        match kind {
            ScriptKind::PreRequest => &mut self.pre_request,
            ScriptKind::PostResponse => &mut self.post_response,
            ScriptKind::Tests => &mut self.tests,
            ScriptKind::Hooks => &mut self.hooks,
        }
    }

    pub fn is_empty(&self) -> bool {
        ScriptKind::ALL.iter().all(|kind| self.get(*kind).is_none())
    }

    /// Back to list form, in [`ScriptKind::ALL`] order, populated slots only.
    pub fn into_scripts(self) -> Vec<Script> {
        ScriptKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|code| Script::new(*kind, code)))
            .collect()
    }
}

/// Compose the located request's scripts with those of its ancestors.
pub fn resolve_scripts(
    collection: &Collection,
    lineage: &Lineage<'_>,
    flow: ScriptFlow,
    separator: &str,
) -> Vec<Script> {
    // Outermost first: collection, folders root to leaf, request.
    let mut layers = Vec::with_capacity(lineage.ancestors.len() + 2);
    layers.push(ScriptSet::from_scripts(&collection.defaults.scripts));
    layers.extend(
        lineage
            .ancestors
            .iter()
            .map(|folder| ScriptSet::from_scripts(&folder.defaults.scripts)),
    );
    layers.push(ScriptSet::from_scripts(&lineage.request.scripts));

    let mut composed = match flow {
        ScriptFlow::Sandwich => sandwich(&layers, separator),
        ScriptFlow::Sequential => sequential(&layers),
    };
    composed.hooks = layers.last().and_then(|own| own.hooks.clone());

    tracing::trace!(%flow, layers = layers.len(), "composed scripts");
    composed.into_scripts()
}

fn sandwich(layers: &[ScriptSet], separator: &str) -> ScriptSet {
    let mut composed = ScriptSet::default();
    composed.set(
        ScriptKind::PreRequest,
        join(layers.iter(), ScriptKind::PreRequest, separator),
    );
    composed.set(
        ScriptKind::PostResponse,
        join(layers.iter().rev(), ScriptKind::PostResponse, separator),
    );
    composed.set(
        ScriptKind::Tests,
        join(layers.iter(), ScriptKind::Tests, separator),
    );
    composed
}

fn join<'a>(
    layers: impl Iterator<Item = &'a ScriptSet>,
    kind: ScriptKind,
    separator: &str,
) -> Option<String> {
    let parts: Vec<&str> = layers.filter_map(|layer| layer.get(kind)).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

fn sequential(layers: &[ScriptSet]) -> ScriptSet {
    let mut composed = ScriptSet::default();
    for layer in layers {
        for kind in [ScriptKind::PreRequest, ScriptKind::PostResponse, ScriptKind::Tests] {
            if let Some(code) = layer.get(kind) {
                composed.set(kind, Some(code.to_string()));
            }
        }
    }
    composed
}
