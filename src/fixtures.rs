#[cfg(test)]
pub mod test {
    use crate::locate::{Lineage, RequestSelector, locate};
    use crate::model::{
        Auth, AuthScheme, Collection, Defaults, Folder, Header, Request, ScriptKind, Variable,
    };

    /// A small but realistic tree:
    ///
    /// ```text
    /// Users API                 X-Env: prod, apikey(K1)
    /// ├── health                (root-level request)
    /// ├── api                   X-Api-Version: 2, auth inherit
    /// │   ├── users             X-Env: staging
    /// │   │   ├── get-user
    /// │   │   └── list-a        "List" GET /items
    /// │   └── admin             bearer(admin-token)
    /// │       └── delete-user
    /// └── misc
    ///     └── list-b            "List" GET /items (same signature as list-a)
    /// ```
    pub fn nested_collection() -> Collection {
        let users = Folder::new("users")
            .with_id("fld-users")
            .with_defaults(
                Defaults::default()
                    .with_header(Header::new("X-Env", "staging"))
                    .with_auth(Auth::Inherit)
                    .with_variable(Variable::new("region", "us"))
                    .with_script(ScriptKind::PreRequest, "B")
                    .with_script(ScriptKind::PostResponse, "Y"),
            )
            .with_item(
                Request::http(
                    "get-user",
                    "Get user",
                    "GET",
                    "https://api.example.com/users/{{id}}",
                )
                .with_auth(Auth::Inherit)
                .with_variable(Variable::new("id", 42))
                .with_script(ScriptKind::PreRequest, "C")
                .with_script(ScriptKind::PostResponse, "Z"),
            )
            .with_item(Request::http("list-a", "List", "GET", "/items"));

        let admin = Folder::new("admin")
            .with_defaults(Defaults::default().with_auth(AuthScheme::bearer("admin-token").into()))
            .with_item(Request::http(
                "delete-user",
                "Delete user",
                "DELETE",
                "https://api.example.com/users/{{id}}",
            ));

        let api = Folder::new("api")
            .with_defaults(
                Defaults::default()
                    .with_header(Header::new("X-Api-Version", "2"))
                    .with_auth(Auth::Inherit)
                    .with_variable(Variable::new("region", "eu")),
            )
            .with_item(users)
            .with_item(admin);

        Collection::new("Users API")
            .with_defaults(
                Defaults::default()
                    .with_header(Header::new("X-Env", "prod"))
                    .with_header(Header::new("Accept", "application/json"))
                    .with_header(Header::new("X-Debug", "1").disabled())
                    .with_auth(AuthScheme::api_key("X-Api-Key", "K1").into())
                    .with_variable(Variable::new("baseUrl", "https://api.example.com"))
                    .with_script(ScriptKind::PreRequest, "A")
                    .with_script(ScriptKind::PostResponse, "X"),
            )
            .with_item(Request::http("health", "Health", "GET", "/health"))
            .with_item(api)
            .with_item(
                Folder::new("misc").with_item(Request::http("list-b", "List", "GET", "/items")),
            )
    }

    /// Collection → one folder per entry of `folders` (outermost first) →
    /// `request`.
    pub fn chain(collection: Defaults, folders: Vec<Defaults>, request: Request) -> Collection {
        let mut node: Option<Folder> = None;
        for (depth, defaults) in folders.into_iter().enumerate().rev() {
            let mut folder = Folder::new(&format!("level-{depth}")).with_defaults(defaults);
            folder = match node.take() {
                Some(child) => folder.with_item(child),
                None => folder.with_item(request.clone()),
            };
            node = Some(folder);
        }
        let collection = Collection::new("chain").with_defaults(collection);
        match node {
            Some(folder) => collection.with_item(folder),
            None => collection.with_item(request),
        }
    }

    /// Unique lineage of the request with the given id.
    pub fn lineage_of<'c>(collection: &'c Collection, id: &str) -> Lineage<'c> {
        locate(collection, &RequestSelector::id(id))
            .lineage()
            .unwrap_or_else(|| panic!("fixture has no unique request '{id}'"))
    }

    #[test]
    fn chain_nests_folders_outermost_first() {
        let collection = chain(
            Defaults::default(),
            vec![Defaults::default(), Defaults::default()],
            Request::new("leaf", "leaf"),
        );
        let lineage = lineage_of(&collection, "leaf");
        let names: Vec<_> = lineage
            .ancestors
            .iter()
            .map(|f| f.name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["level-0", "level-1"]);
    }

    #[test]
    fn chain_without_folders_is_root_level() {
        let collection = chain(Defaults::default(), vec![], Request::new("leaf", "leaf"));
        assert!(lineage_of(&collection, "leaf").is_root_level());
    }
}
