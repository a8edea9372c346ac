//! Resolver settings and the layering that produces them.
//!
//! Settings come from four sparse layers, lowest priority first:
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! Settings files        in the order given, later files win
//!        ↑ overridden by
//! Environment vars      REQSCOPE__SCRIPTS__FLOW=sequential
//!        ↑ overridden by
//! Overrides             ResolverBuilder::set("scripts.flow", ..)
//! ```
//!
//! [`load`] runs the whole pipeline on pre-loaded data and does no I/O.
//! [`ResolverBuilder`](crate::ResolverBuilder) gathers that data from disk
//! and the process environment.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use confique::Config;
use confique::meta::{FieldKind, Meta};
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::error::ReqscopeError;
use crate::scripts::DEFAULT_SEPARATOR;
use crate::types::{AmbiguityPolicy, ScriptFlow};

/// Environment variable prefix used unless the builder says otherwise.
pub const DEFAULT_ENV_PREFIX: &str = "REQSCOPE";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// How scripts from different scopes are combined.
    #[config(nested)]
    pub scripts: ScriptSettings,

    /// How the target request is looked up.
    #[config(nested)]
    pub lookup: LookupSettings,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScriptSettings {
    /// Composition strategy: "sandwich" or "sequential".
    #[config(default = "sandwich")]
    pub flow: ScriptFlow,

    /// Text placed between the parts of a composed script. Unset means a
    /// blank line ("\n\n").
    pub separator: Option<String>,
}

impl ScriptSettings {
    /// The configured separator, or the blank-line default.
    pub fn effective_separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)
    }
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LookupSettings {
    /// What to do when several requests match: "error" or "first-match".
    #[config(default = "error")]
    pub ambiguous: AmbiguityPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            scripts: ScriptSettings::default(),
            lookup: LookupSettings::default(),
        }
    }
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            flow: ScriptFlow::default(),
            separator: None,
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            ambiguous: AmbiguityPolicy::default(),
        }
    }
}

/// Everything [`load`] needs. No I/O happens past this point.
pub struct SettingsInput {
    /// Settings file contents, lowest priority first.
    pub files: Vec<(PathBuf, String)>,
    /// Raw environment pairs (`std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// `None` disables the environment layer.
    pub env_prefix: Option<String>,
    /// `(dotted_key, value)` pairs, later entries win.
    pub overrides: Vec<(String, Value)>,
    /// Reject keys the settings struct doesn't know.
    pub strict: bool,
}

/// Merge every layer and produce typed settings.
///
/// Each file, environment variable and override is type-checked on its own
/// before it is merged, so a bad value is reported against whatever
/// introduced it: the file path, the variable name (`REQSCOPE__SCRIPTS__FLOW`)
/// or the dotted override key.
pub fn load(input: SettingsInput) -> Result<ResolverSettings, ReqscopeError> {
    let mut merged = Table::new();

    for (path, content) in &input.files {
        if input.strict {
            reject_unknown_keys(content, path)?;
        }
        let table: Table = toml::from_str(content).map_err(|e| ReqscopeError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        check_values(&table, || path.display().to_string())?;
        tracing::debug!(path = %path.display(), "applying settings file");
        merged = overlay(merged, table);
    }

    if let Some(prefix) = &input.env_prefix {
        for (name, segments, value) in env_entries(prefix, input.env_vars) {
            let mut single = Table::new();
            insert_path(&mut single, &segments, Value::String(value));
            check_values(&single, || name.clone())?;
            tracing::trace!(%name, "applying environment setting");
            merged = overlay(merged, single);
        }
    }

    if !input.overrides.is_empty() {
        let known = leaf_keys(&ResolverSettings::META);
        for (key, value) in input.overrides {
            if !known.contains(&key) {
                return Err(ReqscopeError::UnknownSetting(key));
            }
            let segments: Vec<String> = key.split('.').map(str::to_string).collect();
            let mut single = Table::new();
            insert_path(&mut single, &segments, value);
            check_values(&single, || key.clone())?;
            merged = overlay(merged, single);
        }
    }

    // Every piece was checked above; a failure here means the pieces clash.
    let layer: <ResolverSettings as Config>::Layer = Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| ReqscopeError::InvalidValue {
            key: "settings".into(),
            reason: e.to_string(),
        })?;

    ResolverSettings::builder()
        .preloaded(layer)
        .load()
        .map_err(ReqscopeError::from)
}

/// Commented TOML template listing every setting with its default.
pub fn template() -> String {
    confique::toml::template::<ResolverSettings>(confique::toml::FormatOptions::default())
}

/// Recursively lay `top` over `base`. Tables merge key by key; anything
/// else in `top` replaces what `base` had.
fn overlay(mut base: Table, top: Table) -> Table {
    for (key, top_value) in top {
        let merged = match (base.remove(&key), top_value) {
            (Some(Value::Table(below)), Value::Table(above)) => Value::Table(overlay(below, above)),
            (_, above) => above,
        };
        base.insert(key, merged);
    }
    base
}

/// Variables carrying `prefix`, as `(name, key path, value)`:
/// `{PREFIX}__SCRIPTS__FLOW=sequential` → `["scripts", "flow"]`.
///
/// Every leaf setting is textual, so values are kept as strings.
fn env_entries(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, Vec<String>, String)> {
    let needle = format!("{prefix}__");
    vars.into_iter()
        .filter_map(|(name, value)| {
            let path = name.strip_prefix(&needle).filter(|p| !p.is_empty())?;
            let segments = path.split("__").map(str::to_lowercase).collect();
            Some((name, segments, value))
        })
        .collect()
}

/// Fail with `InvalidValue` naming `origin` if `table` holds a value of the
/// wrong type for its setting. Unknown keys pass.
fn check_values(table: &Table, origin: impl FnOnce() -> String) -> Result<(), ReqscopeError> {
    let checked: Result<<ResolverSettings as Config>::Layer, toml::de::Error> =
        Value::Table(table.clone()).try_into();
    checked
        .map(|_| ())
        .map_err(|e| ReqscopeError::InvalidValue {
            key: origin(),
            reason: e.to_string(),
        })
}

fn insert_path(table: &mut Table, segments: &[String], value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = table;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        if !slot.is_table() {
            *slot = Value::Table(Table::new());
        }
        current = match slot {
            Value::Table(next) => next,
            _ => return,
        };
    }
    current.insert(leaf.clone(), value);
}

/// Dotted paths of every leaf setting, e.g. `"scripts.flow"`.
fn leaf_keys(meta: &Meta) -> HashSet<String> {
    let mut keys = HashSet::new();
    gather_keys(meta, "", &mut keys);
    keys
}

fn gather_keys(meta: &Meta, prefix: &str, keys: &mut HashSet<String>) {
    for field in meta.fields {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &field.kind {
            FieldKind::Leaf { .. } => {
                keys.insert(path);
            }
            FieldKind::Nested { meta, .. } => gather_keys(meta, &path, keys),
        }
    }
}

/// Fail if a settings file has keys the settings struct would ignore.
fn reject_unknown_keys(content: &str, path: &Path) -> Result<(), ReqscopeError> {
    let mut ignored: Vec<String> = Vec::new();
    let deserializer = toml::Deserializer::new(content);
    let _layer: <ResolverSettings as Config>::Layer =
        serde_ignored::deserialize(deserializer, |key| ignored.push(key.to_string())).map_err(
            |e| ReqscopeError::ParseError {
                path: path.to_path_buf(),
                source: e,
            },
        )?;

    if ignored.is_empty() {
        return Ok(());
    }

    let errors = ignored
        .into_iter()
        .map(|key| {
            let line = line_of(content, &key);
            ReqscopeError::UnknownKey {
                key,
                path: path.to_path_buf(),
                line,
            }
        })
        .collect();
    Err(ReqscopeError::UnknownKeys(errors))
}

/// 1-based line where a dotted key is assigned, or 0 if it can't be found.
///
/// Follows `[section]` headers; quoted keys and inline tables are not
/// recognized.
fn line_of(content: &str, dotted: &str) -> usize {
    let (section, leaf) = match dotted.rsplit_once('.') {
        Some((section, leaf)) => (section, leaf),
        None => ("", dotted),
    };
    let mut current = String::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = header.split('.').map(str::trim).collect::<Vec<_>>().join(".");
            continue;
        }
        let assigns_leaf = line
            .strip_prefix(leaf)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if current == section && assigns_leaf {
            return number + 1;
        }
    }
    0
}
