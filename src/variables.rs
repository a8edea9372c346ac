//! Scoped variable dictionaries.
//!
//! Variables are reported per scope rather than merged: collection, folder,
//! and request each get their own map. Whoever substitutes `{{name}}`
//! placeholders applies its own shadowing on top; [`ScopedVariables::effective`]
//! offers the usual "most specific scope wins" view for callers that want it.
//!
//! Values are coerced to strings by [`stringify_value`]:
//!
//! | Declared value     | Text              |
//! |--------------------|-------------------|
//! | absent / `null`    | `""`              |
//! | `"abc"`            | `abc`             |
//! | `true` / `false`   | `true` / `false`  |
//! | `42`, `1.5`        | `42`, `1.5`       |
//! | array / object     | compact JSON      |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::locate::Lineage;
use crate::model::{Collection, Variable};

/// Enabled variables of each scope, name → text value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedVariables {
    pub collection: BTreeMap<String, String>,
    /// All enclosing folders folded root to leaf; the nearest folder wins.
    pub folder: BTreeMap<String, String>,
    pub request: BTreeMap<String, String>,
}

impl ScopedVariables {
    /// One map with request over folder over collection.
    pub fn effective(&self) -> BTreeMap<String, String> {
        let mut merged = self.collection.clone();
        merged.extend(self.folder.clone());
        merged.extend(self.request.clone());
        merged
    }

    /// Value of `name` from the most specific scope that declares it.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.request
            .get(name)
            .or_else(|| self.folder.get(name))
            .or_else(|| self.collection.get(name))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty() && self.folder.is_empty() && self.request.is_empty()
    }
}

/// Build the three scope maps for the located request.
pub fn resolve_variables(collection: &Collection, lineage: &Lineage<'_>) -> ScopedVariables {
    let mut scoped = ScopedVariables::default();
    collect_enabled(&mut scoped.collection, &collection.defaults.variables);
    for folder in &lineage.ancestors {
        collect_enabled(&mut scoped.folder, &folder.defaults.variables);
    }
    collect_enabled(&mut scoped.request, &lineage.request.variables);

    tracing::trace!(
        collection = scoped.collection.len(),
        folder = scoped.folder.len(),
        request = scoped.request.len(),
        "resolved variables"
    );
    scoped
}

fn collect_enabled(into: &mut BTreeMap<String, String>, variables: &[Variable]) {
    for variable in variables.iter().filter(|v| !v.disabled) {
        into.insert(variable.name.clone(), stringify_value(variable.value.as_ref()));
    }
}

/// Text form of a variable value. See the module docs for the table.
pub fn stringify_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(composite @ (Value::Array(_) | Value::Object(_))) => composite.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{chain, lineage_of, nested_collection};
    use crate::model::{Defaults, Request};
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn each_scope_gets_its_own_map() {
        let collection = nested_collection();
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "get-user"));
        assert_eq!(
            scoped.collection,
            map(&[("baseUrl", "https://api.example.com")])
        );
        // "users" declares region=us after "api" declared region=eu.
        assert_eq!(scoped.folder, map(&[("region", "us")]));
        assert_eq!(scoped.request, map(&[("id", "42")]));
    }

    #[test]
    fn same_name_in_every_scope_is_kept_separately() {
        let collection = chain(
            Defaults::default().with_variable(Variable::new("host", "c")),
            vec![Defaults::default().with_variable(Variable::new("host", "f"))],
            Request::new("r", "r").with_variable(Variable::new("host", "r")),
        );
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "r"));
        assert_eq!(scoped.collection["host"], "c");
        assert_eq!(scoped.folder["host"], "f");
        assert_eq!(scoped.request["host"], "r");
        assert_eq!(scoped.lookup("host"), Some("r"));
    }

    #[test]
    fn disabled_variables_are_skipped_in_every_scope() {
        let collection = chain(
            Defaults::default()
                .with_variable(Variable::new("a", "1").disabled())
                .with_variable(Variable::new("keep", "1")),
            vec![Defaults::default().with_variable(Variable::new("b", "2").disabled())],
            Request::new("r", "r").with_variable(Variable::new("c", "3").disabled()),
        );
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "r"));
        assert_eq!(scoped.collection, map(&[("keep", "1")]));
        assert!(scoped.folder.is_empty());
        assert!(scoped.request.is_empty());
    }

    #[test]
    fn disabled_folder_variable_does_not_clear_outer_value() {
        let collection = chain(
            Defaults::default(),
            vec![
                Defaults::default().with_variable(Variable::new("region", "eu")),
                Defaults::default().with_variable(Variable::new("region", "us").disabled()),
            ],
            Request::new("r", "r"),
        );
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "r"));
        assert_eq!(scoped.folder, map(&[("region", "eu")]));
    }

    #[test]
    fn root_level_request_has_empty_folder_scope() {
        let collection = nested_collection();
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "health"));
        assert!(scoped.folder.is_empty());
        assert!(!scoped.collection.is_empty());
    }

    #[test]
    fn returned_maps_do_not_share_storage() {
        let collection = nested_collection();
        let mut scoped = resolve_variables(&collection, &lineage_of(&collection, "get-user"));
        scoped.request.insert("baseUrl".into(), "changed".into());
        scoped.request.insert("region".into(), "changed".into());
        assert_eq!(scoped.collection["baseUrl"], "https://api.example.com");
        assert_eq!(scoped.folder["region"], "us");
    }

    #[test]
    fn effective_view_layers_request_over_folder_over_collection() {
        let scoped = ScopedVariables {
            collection: map(&[("a", "c"), ("b", "c"), ("c", "c")]),
            folder: map(&[("b", "f"), ("c", "f")]),
            request: map(&[("c", "r")]),
        };
        assert_eq!(
            scoped.effective(),
            map(&[("a", "c"), ("b", "f"), ("c", "r")])
        );
        assert_eq!(scoped.lookup("missing"), None);
    }

    #[test]
    fn stringify_covers_every_json_shape() {
        assert_eq!(stringify_value(None), "");
        assert_eq!(stringify_value(Some(&Value::Null)), "");
        assert_eq!(stringify_value(Some(&json!("text"))), "text");
        assert_eq!(stringify_value(Some(&json!(""))), "");
        assert_eq!(stringify_value(Some(&json!(true))), "true");
        assert_eq!(stringify_value(Some(&json!(false))), "false");
        assert_eq!(stringify_value(Some(&json!(0))), "0");
        assert_eq!(stringify_value(Some(&json!(-7))), "-7");
        assert_eq!(stringify_value(Some(&json!(1.5))), "1.5");
        assert_eq!(stringify_value(Some(&json!([1, "a"]))), r#"[1,"a"]"#);
        assert_eq!(stringify_value(Some(&json!({"k": "v"}))), r#"{"k":"v"}"#);
    }

    #[test]
    fn unset_variable_resolves_to_empty_string() {
        let collection = chain(
            Defaults::default(),
            vec![],
            Request::new("r", "r").with_variable(Variable::unset("token")),
        );
        let scoped = resolve_variables(&collection, &lineage_of(&collection, "r"));
        assert_eq!(scoped.request, map(&[("token", "")]));
    }
}
