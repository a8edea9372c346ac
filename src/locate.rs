//! Find a request in the collection tree and the folders above it.
//!
//! The walk is depth-first, pre-order, and collects *every* match so that
//! duplicate identities surface as [`Location::Ambiguous`] instead of
//! silently resolving to whichever request happens to come first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Collection, Folder, Item, Request};

/// How the caller identifies the target request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestSelector {
    /// Match on the request's stable `id`.
    Id(String),
    /// Match on `(name, method, url)`, exact and case-sensitive on all three.
    Signature {
        name: String,
        method: Option<String>,
        url: String,
    },
}

impl RequestSelector {
    pub fn id(id: &str) -> Self {
        RequestSelector::Id(id.to_string())
    }

    pub fn signature(name: &str, method: Option<&str>, url: &str) -> Self {
        RequestSelector::Signature {
            name: name.to_string(),
            method: method.map(str::to_string),
            url: url.to_string(),
        }
    }

    /// Selector matching exactly this request's signature.
    pub fn signature_of(request: &Request) -> Self {
        RequestSelector::Signature {
            name: request.name.clone(),
            method: request.method.clone(),
            url: request.url.clone(),
        }
    }

    pub fn matches(&self, request: &Request) -> bool {
        match self {
            RequestSelector::Id(id) => request.id == *id,
            RequestSelector::Signature { name, method, url } => {
                request.name == *name && request.method == *method && request.url == *url
            }
        }
    }
}

impl fmt::Display for RequestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSelector::Id(id) => write!(f, "id '{id}'"),
            RequestSelector::Signature { name, method, url } => {
                let method = method.as_deref().unwrap_or("<no method>");
                write!(f, "'{name}' ({method} {url})")
            }
        }
    }
}

/// A located request plus its enclosing folders, root first.
///
/// `ancestors` excludes both the collection itself and the request.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineage<'c> {
    pub ancestors: Vec<&'c Folder>,
    pub request: &'c Request,
}

impl<'c> Lineage<'c> {
    pub fn new(ancestors: Vec<&'c Folder>, request: &'c Request) -> Self {
        Self { ancestors, request }
    }

    /// Whether the request sits directly under the collection.
    pub fn is_root_level(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Enclosing folders, nearest first.
    pub fn nearest_first(&self) -> impl Iterator<Item = &'c Folder> + '_ {
        self.ancestors.iter().rev().copied()
    }
}

/// Outcome of looking up a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<'c> {
    NotFound,
    /// Exactly one match, directly under the collection.
    AtRoot(&'c Request),
    /// Exactly one match, nested in at least one folder.
    InFolders {
        ancestors: Vec<&'c Folder>,
        request: &'c Request,
    },
    /// More than one match, in traversal order.
    Ambiguous(Vec<Lineage<'c>>),
}

impl<'c> Location<'c> {
    /// The unique match, if there is exactly one.
    pub fn lineage(&self) -> Option<Lineage<'c>> {
        match self {
            Location::AtRoot(request) => Some(Lineage::new(Vec::new(), request)),
            Location::InFolders { ancestors, request } => {
                Some(Lineage::new(ancestors.clone(), request))
            }
            Location::NotFound | Location::Ambiguous(_) => None,
        }
    }

    /// The first match in traversal order, whether or not it is unique.
    pub fn first_match(&self) -> Option<Lineage<'c>> {
        match self {
            Location::Ambiguous(matches) => matches.first().cloned(),
            _ => self.lineage(),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Location::NotFound)
    }

    /// Number of requests the selector matched.
    pub fn match_count(&self) -> usize {
        match self {
            Location::NotFound => 0,
            Location::AtRoot(_) | Location::InFolders { .. } => 1,
            Location::Ambiguous(matches) => matches.len(),
        }
    }
}

/// Locate the request selected by `selector`.
pub fn locate<'c>(collection: &'c Collection, selector: &RequestSelector) -> Location<'c> {
    let mut trail = Vec::new();
    let mut found = Vec::new();
    walk(&collection.items, selector, &mut trail, &mut found);

    tracing::trace!(%selector, matches = found.len(), "located request");

    match found.len() {
        0 => Location::NotFound,
        1 => {
            let Lineage { ancestors, request } = found.remove(0);
            if ancestors.is_empty() {
                Location::AtRoot(request)
            } else {
                Location::InFolders { ancestors, request }
            }
        }
        _ => Location::Ambiguous(found),
    }
}

fn walk<'c>(
    items: &'c [Item],
    selector: &RequestSelector,
    trail: &mut Vec<&'c Folder>,
    found: &mut Vec<Lineage<'c>>,
) {
    for item in items {
        match item {
            Item::Request(request) if selector.matches(request) => {
                found.push(Lineage::new(trail.clone(), request));
            }
            Item::Folder(folder) => {
                trail.push(folder);
                walk(&folder.items, selector, trail, found);
                trail.pop();
            }
            Item::Request(_) | Item::Script(_) => {}
        }
    }
}
