//! Auth inheritance: the nearest concrete scheme wins.

use crate::locate::Lineage;
use crate::model::{AuthScheme, Collection};

/// Resolve the auth scheme the located request should use.
///
/// A request that declares a concrete scheme keeps it. A request with no
/// auth, or with `inherit`, takes the first concrete scheme found walking
/// its folders nearest first, then the collection. Returns `None` when no
/// scope declares anything concrete.
pub fn resolve_auth(collection: &Collection, lineage: &Lineage<'_>) -> Option<AuthScheme> {
    if let Some(scheme) = lineage.request.auth.as_ref().and_then(|a| a.scheme()) {
        return Some(scheme.clone());
    }

    for folder in lineage.nearest_first() {
        if let Some(scheme) = folder.defaults.auth.as_ref().and_then(|a| a.scheme()) {
            tracing::debug!(folder = ?folder.name, "auth inherited from folder");
            return Some(scheme.clone());
        }
    }

    let inherited = collection
        .defaults
        .auth
        .as_ref()
        .and_then(|a| a.scheme())
        .cloned();
    if inherited.is_some() {
        tracing::debug!("auth inherited from collection");
    }
    inherited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{chain, lineage_of, nested_collection};
    use crate::model::{Auth, Defaults, Request};

    fn k1() -> AuthScheme {
        AuthScheme::api_key("X-Api-Key", "K1")
    }

    #[test]
    fn inherit_all_the_way_up_reaches_collection() {
        let collection = chain(
            Defaults::default().with_auth(k1().into()),
            vec![Defaults::default().with_auth(Auth::Inherit)],
            Request::new("r", "r").with_auth(Auth::Inherit),
        );
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "r")),
            Some(k1())
        );
    }

    #[test]
    fn request_scheme_is_never_overridden() {
        let collection = chain(
            Defaults::default().with_auth(k1().into()),
            vec![Defaults::default().with_auth(AuthScheme::bearer("folder").into())],
            Request::new("r", "r").with_auth(AuthScheme::basic("me", "pw").into()),
        );
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "r")),
            Some(AuthScheme::basic("me", "pw"))
        );
    }

    #[test]
    fn nearest_folder_wins() {
        let collection = chain(
            Defaults::default().with_auth(k1().into()),
            vec![
                Defaults::default().with_auth(AuthScheme::bearer("outer").into()),
                Defaults::default().with_auth(Auth::Inherit),
                Defaults::default().with_auth(AuthScheme::bearer("inner").into()),
                Defaults::default(),
            ],
            Request::new("r", "r"),
        );
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "r")),
            Some(AuthScheme::bearer("inner"))
        );
    }

    #[test]
    fn absent_request_auth_behaves_like_inherit() {
        let collection = nested_collection();
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "delete-user")),
            Some(AuthScheme::bearer("admin-token"))
        );
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "health")),
            Some(k1())
        );
    }

    #[test]
    fn nothing_concrete_resolves_to_none() {
        let collection = chain(
            Defaults::default().with_auth(Auth::Inherit),
            vec![Defaults::default().with_auth(Auth::Inherit)],
            Request::new("r", "r").with_auth(Auth::Inherit),
        );
        assert_eq!(resolve_auth(&collection, &lineage_of(&collection, "r")), None);
    }

    #[test]
    fn explicit_none_scheme_stops_inheritance() {
        let collection = chain(
            Defaults::default().with_auth(k1().into()),
            vec![Defaults::default().with_auth(AuthScheme::None.into())],
            Request::new("r", "r"),
        );
        assert_eq!(
            resolve_auth(&collection, &lineage_of(&collection, "r")),
            Some(AuthScheme::None)
        );
    }
}
