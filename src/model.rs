//! In-memory collection tree consumed by the resolvers.
//!
//! A [`Collection`] owns an ordered list of [`Item`]s. Folders nest further
//! items; requests are leaves. Both the collection and every folder may carry
//! a [`Defaults`] block whose headers, auth, variables, and scripts are
//! inherited by the requests beneath them.
//!
//! Every type here derives `Serialize`/`Deserialize`, so a collection can be
//! loaded from JSON with `serde_json::from_str::<Collection>(..)`:
//!
//! ```json
//! {
//!   "name": "Users API",
//!   "defaults": { "headers": [{ "name": "X-Env", "value": "prod" }] },
//!   "items": [
//!     { "type": "folder", "name": "users", "items": [
//!       { "type": "request", "id": "get-user", "name": "Get user",
//!         "method": "GET", "url": "https://api.example.com/users/1" }
//!     ]}
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReqscopeError;

/// Root of the request hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_item(mut self, item: impl Into<Item>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Read and parse a collection JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReqscopeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReqscopeError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ReqscopeError::CollectionParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// One node of the collection tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Folder(Folder),
    Request(Request),
    /// Standalone script file. Carried through untouched; never merged.
    Script(ScriptFile),
}

impl Item {
    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }

    /// Display name of the item, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Item::Folder(folder) => folder.name.as_deref(),
            Item::Request(request) => Some(request.name.as_str()).filter(|n| !n.is_empty()),
            Item::Script(_) => None,
        }
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}

impl From<Request> for Item {
    fn from(request: Request) -> Self {
        Item::Request(request)
    }
}

impl From<ScriptFile> for Item {
    fn from(script: ScriptFile) -> Self {
        Item::Script(script)
    }
}

/// Grouping node. Its defaults apply to every request beneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Folder {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_item(mut self, item: impl Into<Item>) -> Self {
        self.items.push(item.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// Settings shared by the collection and folder scopes.
///
/// `metadata` is the gRPC counterpart of `headers`. `settings` is opaque to
/// the resolvers and is only carried for the caller's benefit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Script>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Map<String, Value>>,
}

impl Defaults {
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_metadata(mut self, entry: Header) -> Self {
        self.metadata.push(entry);
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_script(mut self, kind: ScriptKind, code: &str) -> Self {
        self.scripts.push(Script::new(kind, code));
        self
    }

    /// Headers inherited by a request of the given protocol.
    pub fn inheritable_headers(&self, protocol: Protocol) -> &[Header] {
        match protocol {
            Protocol::Grpc => &self.metadata,
            _ => &self.headers,
        }
    }
}

/// Transport a request is issued over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Graphql,
    Grpc,
    Websocket,
}

impl Protocol {
    /// Method assumed when a request does not declare one.
    pub fn default_method(self) -> Option<&'static str> {
        match self {
            Protocol::Http => Some("GET"),
            Protocol::Graphql => Some("POST"),
            Protocol::Grpc | Protocol::Websocket => None,
        }
    }
}

/// A leaf of the collection tree.
///
/// `id` is the stable identity used for lookup. The `(name, method, url)`
/// signature is kept for callers that only know what the request looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    /// gRPC metadata. Treated as more of the request's own headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Script>,
}

impl Request {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn http(id: &str, name: &str, method: &str, url: &str) -> Self {
        Self {
            method: Some(method.to_string()),
            url: url.to_string(),
            ..Self::new(id, name)
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn with_metadata(mut self, entry: Header) -> Self {
        self.metadata.push(entry);
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_script(mut self, kind: ScriptKind, code: &str) -> Self {
        self.scripts.push(Script::new(kind, code));
        self
    }

    /// Own headers followed by own metadata, in declared order.
    pub fn own_headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().chain(&self.metadata)
    }

    /// Declared method, falling back to the protocol's default.
    pub fn effective_method(&self) -> Option<String> {
        self.method
            .clone()
            .or_else(|| self.protocol.default_method().map(str::to_string))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A header (or gRPC metadata entry). Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            disabled: false,
            description: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Case-folded name used as the merge key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A variable declaration. The value may be any JSON value, or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

impl Variable {
    pub fn new(name: &str, value: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.into()),
            disabled: false,
        }
    }

    /// A declaration without a value.
    pub fn unset(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Lifecycle slot a script runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    #[serde(alias = "before-request")]
    PreRequest,
    #[serde(alias = "after-response")]
    PostResponse,
    Tests,
    Hooks,
}

impl ScriptKind {
    /// Every kind, in output order.
    pub const ALL: [ScriptKind; 4] = [
        ScriptKind::PreRequest,
        ScriptKind::PostResponse,
        ScriptKind::Tests,
        ScriptKind::Hooks,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "type")]
    pub kind: ScriptKind,
    #[serde(default)]
    pub code: String,
}

impl Script {
    pub fn new(kind: ScriptKind, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }
}

/// Auth as declared at some scope: either defer to the parent, or a
/// concrete scheme.
///
/// On the wire, `"inherit"` is the bare string; schemes are objects tagged
/// by `type`. The bare string `"none"` is shorthand for `{"type": "none"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AuthRepr", into = "AuthRepr")]
pub enum Auth {
    Inherit,
    Scheme(AuthScheme),
}

impl Auth {
    /// The concrete scheme, or `None` for `inherit`.
    pub fn scheme(&self) -> Option<&AuthScheme> {
        match self {
            Auth::Inherit => None,
            Auth::Scheme(scheme) => Some(scheme),
        }
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Auth::Inherit)
    }
}

impl From<AuthScheme> for Auth {
    fn from(scheme: AuthScheme) -> Self {
        Auth::Scheme(scheme)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AuthRepr {
    Keyword(String),
    Scheme(AuthScheme),
}

impl TryFrom<AuthRepr> for Auth {
    type Error = String;

    fn try_from(repr: AuthRepr) -> Result<Self, Self::Error> {
        match repr {
            AuthRepr::Keyword(word) => match word.as_str() {
                "inherit" => Ok(Auth::Inherit),
                "none" => Ok(Auth::Scheme(AuthScheme::None)),
                other => Err(format!(
                    "unknown auth keyword '{other}', expected \"inherit\", \"none\" or a scheme object"
                )),
            },
            AuthRepr::Scheme(scheme) => Ok(Auth::Scheme(scheme)),
        }
    }
}

impl From<Auth> for AuthRepr {
    fn from(auth: Auth) -> Self {
        match auth {
            Auth::Inherit => AuthRepr::Keyword("inherit".into()),
            Auth::Scheme(scheme) => AuthRepr::Scheme(scheme),
        }
    }
}

/// A concrete authentication scheme.
///
/// `None` is an explicit "send no credentials" choice. It stops inheritance
/// like any other concrete scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthScheme {
    None,
    Basic {
        username: String,
        #[serde(default)]
        password: String,
    },
    Bearer {
        token: String,
    },
    Digest {
        username: String,
        #[serde(default)]
        password: String,
    },
    ApiKey {
        key: String,
        value: String,
        #[serde(default)]
        placement: ApiKeyPlacement,
    },
    OAuth2 {
        #[serde(rename = "grantType", alias = "grant_type")]
        grant_type: String,
        #[serde(flatten)]
        fields: BTreeMap<String, Value>,
    },
}

impl AuthScheme {
    pub fn api_key(key: &str, value: &str) -> Self {
        AuthScheme::ApiKey {
            key: key.to_string(),
            value: value.to_string(),
            placement: ApiKeyPlacement::Header,
        }
    }

    pub fn bearer(token: &str) -> Self {
        AuthScheme::Bearer {
            token: token.to_string(),
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        AuthScheme::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyPlacement {
    #[default]
    Header,
    Query,
}
