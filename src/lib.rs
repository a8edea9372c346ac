//! Resolve the effective configuration of a request inside a hierarchical
//! API collection.
//!
//! A collection is a tree: folders nest folders and requests, and the
//! collection plus every folder may declare defaults (headers, auth,
//! variables, scripts). Reqscope finds one request in that tree and works
//! out what it actually inherits:
//!
//! ```ignore
//! let collection = Collection::load("users-api.json")?;
//! let config = Resolver::default()
//!     .resolve(&collection, &RequestSelector::id("get-user"))?;
//! ```
//!
//! The collection is only borrowed. Resolution never mutates it, and a
//! [`Resolver`] holds nothing but settings, so one resolver can be shared
//! across threads.
//!
//! # Locating the request
//!
//! [`RequestSelector::Id`] matches a request's stable id.
//! [`RequestSelector::Signature`] matches `(name, method, url)` exactly.
//! The tree is walked depth-first, pre-order, and every match is collected:
//!
//! - no match is [`ReqscopeError::TargetNotFound`]
//! - a match directly under the collection resolves with the collection's
//!   defaults only
//! - several matches are [`ReqscopeError::AmbiguousTarget`], unless
//!   `lookup.ambiguous = "first-match"` picks the first one in traversal order
//!
//! # Inheritance rules
//!
//! | Concern   | Rule                                                                   |
//! |-----------|------------------------------------------------------------------------|
//! | Headers   | Request's own enabled headers, then inherited ones it doesn't name     |
//! | Auth      | Request's concrete scheme, else nearest folder's, else collection's    |
//! | Variables | One map per scope: collection, folders (nearest wins), request         |
//! | Scripts   | Composed per [`ScriptFlow`]                                            |
//!
//! Header names compare case-insensitively; between ancestors, the nearer
//! scope wins. Disabled headers and variables are skipped everywhere. gRPC
//! requests inherit each scope's `metadata` list instead of `headers`.
//!
//! # Script flows
//!
//! ```text
//! sandwich     pre-request:   collection → folders → request
//!              post-response: request → folders → collection
//!              tests:         collection → folders → request
//!
//! sequential   the nearest scope that defines a script kind wins
//! ```
//!
//! A request's `hooks` script is passed through as declared in both flows.
//!
//! # Settings
//!
//! Resolver behavior is configured through [`ResolverSettings`], loaded
//! from sparse layers:
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! Settings files        ResolverBuilder::settings_file(), later files win
//!        ↑ overridden by
//! Environment vars      REQSCOPE__SCRIPTS__FLOW=sequential
//!        ↑ overridden by
//! Overrides             ResolverBuilder::set(), script_flow(), first_match()
//! ```
//!
//! ```toml
//! [scripts]
//! flow = "sandwich"      # or "sequential"
//! separator = ";"     # unset: a blank line
//!
//! [lookup]
//! ambiguous = "error"    # or "first-match"
//! ```
//!
//! Unknown keys in settings files are rejected with their line number unless
//! the builder is set to `strict(false)`. [`settings::template()`] prints a
//! commented file with every default.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`cli::ResolveArgs`] can be
//! flattened into any clap parser, and the `reqscope` binary wraps it:
//!
//! ```text
//! reqscope users-api.json --id get-user
//! reqscope users-api.json --name List --method GET --url /items --first-match
//! reqscope --settings-template
//! ```
//!
//! # Logging
//!
//! The library emits [`tracing`] events (trace for lookups, debug for
//! inheritance decisions, warn when an ambiguous match is tolerated) and
//! installs no subscriber. The binary logs to stderr, filtered by
//! `RUST_LOG` or `-v`.

pub mod display;
pub mod error;
pub mod locate;
pub mod model;
pub mod settings;
pub mod types;
pub mod variables;

mod auth;
mod builder;
#[cfg(feature = "clap")]
pub mod cli;
mod headers;
mod resolve;
pub mod scripts;

#[cfg(test)]
mod fixtures;

pub use auth::resolve_auth;
pub use builder::ResolverBuilder;
pub use error::ReqscopeError;
pub use headers::resolve_headers;
pub use locate::{Lineage, Location, RequestSelector, locate};
pub use model::{
    ApiKeyPlacement, Auth, AuthScheme, Collection, Defaults, Folder, Header, Item, Protocol,
    Request, Script, ScriptFile, ScriptKind, Variable,
};
pub use resolve::{ResolvedRequestConfig, Resolver};
pub use scripts::{ScriptSet, resolve_scripts};
pub use settings::ResolverSettings;
pub use types::{AmbiguityPolicy, ScriptFlow};
pub use variables::{ScopedVariables, resolve_variables};
