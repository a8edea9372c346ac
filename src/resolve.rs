//! The resolver facade: locate a request, then run every per-concern
//! resolver over its lineage.
//!
//! [`Resolver`] holds only settings and borrows the collection for the
//! duration of a call, so one resolver can serve many collections and many
//! threads at once. Nothing here mutates the collection.

use serde::{Deserialize, Serialize};

use crate::auth::resolve_auth;
use crate::builder::ResolverBuilder;
use crate::error::ReqscopeError;
use crate::headers::resolve_headers;
use crate::locate::{Lineage, Location, RequestSelector, locate};
use crate::model::{AuthScheme, Collection, Header, Protocol, Script};
use crate::scripts::resolve_scripts;
use crate::settings::ResolverSettings;
use crate::types::AmbiguityPolicy;
use crate::variables::{ScopedVariables, resolve_variables};

/// Everything a request inherits, resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRequestConfig {
    pub request_id: String,
    pub name: String,
    pub protocol: Protocol,
    /// Declared method, or the protocol default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub url: String,
    pub headers: Vec<Header>,
    /// `None` when no scope declares a concrete scheme.
    pub auth: Option<AuthScheme>,
    pub variables: ScopedVariables,
    pub scripts: Vec<Script>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolver {
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Find the target request, applying the ambiguity policy.
    pub fn locate<'c>(
        &self,
        collection: &'c Collection,
        selector: &RequestSelector,
    ) -> Result<Lineage<'c>, ReqscopeError> {
        match locate(collection, selector) {
            Location::NotFound => Err(ReqscopeError::TargetNotFound {
                selector: selector.clone(),
            }),
            Location::AtRoot(request) => Ok(Lineage::new(Vec::new(), request)),
            Location::InFolders { ancestors, request } => Ok(Lineage::new(ancestors, request)),
            Location::Ambiguous(mut matches) => match self.settings.lookup.ambiguous {
                AmbiguityPolicy::Error => Err(ReqscopeError::AmbiguousTarget {
                    selector: selector.clone(),
                    count: matches.len(),
                }),
                AmbiguityPolicy::FirstMatch => {
                    tracing::warn!(
                        %selector,
                        count = matches.len(),
                        "several requests match; using the first"
                    );
                    Ok(matches.swap_remove(0))
                }
            },
        }
    }

    /// Locate and resolve in one step.
    pub fn resolve(
        &self,
        collection: &Collection,
        selector: &RequestSelector,
    ) -> Result<ResolvedRequestConfig, ReqscopeError> {
        let lineage = self.locate(collection, selector)?;
        Ok(self.resolve_lineage(collection, &lineage))
    }

    /// Resolve a request whose lineage is already known.
    pub fn resolve_lineage(
        &self,
        collection: &Collection,
        lineage: &Lineage<'_>,
    ) -> ResolvedRequestConfig {
        let request = lineage.request;
        tracing::debug!(
            request = %request.id,
            depth = lineage.ancestors.len(),
            "resolving request"
        );

        ResolvedRequestConfig {
            request_id: request.id.clone(),
            name: request.name.clone(),
            protocol: request.protocol,
            method: request.effective_method(),
            url: request.url.clone(),
            headers: resolve_headers(collection, lineage),
            auth: resolve_auth(collection, lineage),
            variables: resolve_variables(collection, lineage),
            scripts: resolve_scripts(
                collection,
                lineage,
                self.settings.scripts.flow,
                self.settings.scripts.effective_separator(),
            ),
        }
    }

    /// Only the scoped variables of the selected request.
    pub fn variables(
        &self,
        collection: &Collection,
        selector: &RequestSelector,
    ) -> Result<ScopedVariables, ReqscopeError> {
        let lineage = self.locate(collection, selector)?;
        Ok(resolve_variables(collection, &lineage))
    }
}
