//! Clap adapter for reqscope.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The library
//! itself never depends on clap: [`ResolveArgs`] just turns parsed flags into
//! a [`RequestSelector`] and a configured [`ResolverBuilder`], and everything
//! after that goes through the ordinary API.
//!
//! Embed it in your own parser with `#[command(flatten)]`:
//!
//! ```ignore
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     resolve: ResolveArgs,
//! }
//! ```

use std::path::PathBuf;

use clap::Args;

use crate::builder::ResolverBuilder;
use crate::error::ReqscopeError;
use crate::locate::RequestSelector;
use crate::model::Collection;
use crate::resolve::{ResolvedRequestConfig, Resolver};
use crate::settings;
use crate::types::ScriptFlow;
use crate::variables::ScopedVariables;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Collection JSON file.
    #[arg(required_unless_present = "settings_template")]
    pub collection: Option<PathBuf>,

    /// Select the request by id.
    #[arg(long, conflicts_with_all = ["name", "url", "method"])]
    pub id: Option<String>,

    /// Select the request by name (requires --url).
    #[arg(long, requires = "url")]
    pub name: Option<String>,

    /// Request URL, exactly as written in the collection.
    #[arg(long, requires = "name")]
    pub url: Option<String>,

    /// Request method, exactly as written in the collection.
    #[arg(long, requires = "name")]
    pub method: Option<String>,

    /// Script composition strategy.
    #[arg(long, value_enum)]
    pub flow: Option<ScriptFlow>,

    /// Text between the parts of a composed script.
    #[arg(long)]
    pub separator: Option<String>,

    /// Settings file; may be repeated, later files win.
    #[arg(long = "settings", value_name = "FILE")]
    pub settings_files: Vec<PathBuf>,

    /// Use the first of several matching requests instead of failing.
    #[arg(long)]
    pub first_match: bool,

    /// Accept unknown keys in settings files.
    #[arg(long)]
    pub lenient: bool,

    /// Print only the scoped variables.
    #[arg(long)]
    pub vars_only: bool,

    /// Print a commented settings template and exit.
    #[arg(long, exclusive = true)]
    pub settings_template: bool,
}

/// What a [`ResolveArgs`] invocation produced.
#[derive(Debug)]
pub enum Outcome {
    Template(String),
    Resolved(Box<ResolvedRequestConfig>),
    Variables(ScopedVariables),
}

impl ResolveArgs {
    /// The target request, or `None` if neither `--id` nor `--name` was given.
    pub fn selector(&self) -> Option<RequestSelector> {
        if let Some(id) = &self.id {
            return Some(RequestSelector::id(id));
        }
        match (&self.name, &self.url) {
            (Some(name), Some(url)) => Some(RequestSelector::signature(
                name,
                self.method.as_deref(),
                url,
            )),
            _ => None,
        }
    }

    /// Layer the flags on top of `builder`. Flags beat files and environment.
    pub fn apply(&self, builder: ResolverBuilder) -> ResolverBuilder {
        let mut builder = self
            .settings_files
            .iter()
            .fold(builder, |b, path| b.settings_file(path))
            .strict(!self.lenient)
            .set_opt("scripts.flow", self.flow.map(ScriptFlow::as_str))
            .set_opt("scripts.separator", self.separator.as_deref());
        if self.first_match {
            builder = builder.first_match();
        }
        builder
    }

    /// Load settings and the collection, then resolve.
    pub fn execute(&self, builder: ResolverBuilder) -> Result<Outcome, ReqscopeError> {
        if self.settings_template {
            return Ok(Outcome::Template(settings::template()));
        }

        let selector = self.selector().ok_or_else(|| ReqscopeError::InvalidValue {
            key: "selector".into(),
            reason: "pass --id, or --name with --url".into(),
        })?;
        let path = self
            .collection
            .as_ref()
            .ok_or_else(|| ReqscopeError::InvalidValue {
                key: "collection".into(),
                reason: "a collection file is required".into(),
            })?;

        let resolver: Resolver = self.apply(builder).build()?;
        let collection = Collection::load(path)?;

        if self.vars_only {
            return resolver
                .variables(&collection, &selector)
                .map(Outcome::Variables);
        }
        resolver
            .resolve(&collection, &selector)
            .map(|config| Outcome::Resolved(Box::new(config)))
    }
}
