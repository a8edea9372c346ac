//! Stable identifiers and ordering for presenting a collection tree.
//!
//! None of this affects resolution. It exists so that tools rendering a
//! collection (navigation, anchors, docs) agree on ids and order.

use std::cmp::Ordering;

use crate::model::Item;

/// Fallback for items with no usable id or name.
pub const UNNAMED: &str = "unnamed-item";

/// Slug form of `text`: lowercase, runs of anything outside `[a-z0-9_-]`
/// become a single `-`, no leading or trailing dashes.
///
/// Only empty input falls back to [`UNNAMED`]; input made entirely of
/// punctuation slugs to `""`.
pub fn safe_id(text: &str) -> String {
    if text.is_empty() {
        return UNNAMED.to_string();
    }
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        let keep = c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_';
        if keep {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Identity used for display: request id, then folder id, then name.
pub fn item_key(item: &Item) -> &str {
    let key = match item {
        Item::Request(request) if !request.id.is_empty() => Some(request.id.as_str()),
        Item::Folder(folder) => folder.id.as_deref().filter(|id| !id.is_empty()),
        _ => None,
    };
    key.or_else(|| item.name().filter(|name| !name.is_empty()))
        .unwrap_or(UNNAMED)
}

/// Anchor id for an item, prefixed with its parent's slug if any.
pub fn section_id(item: &Item, parent: Option<&str>) -> String {
    let own = safe_id(item_key(item));
    match parent {
        Some(parent) if !parent.is_empty() => format!("{}-{own}", safe_id(parent)),
        _ => own,
    }
}

/// Folders before everything else, then case-insensitive by [`item_key`].
///
/// Keys are lowercased and compared byte-wise, not by locale, so accented
/// names sort after plain ASCII ones. The sort is stable, so equal keys keep
/// their original order.
pub fn sort_folders_first(items: &mut [Item]) {
    items.sort_by(compare_for_display);
}

fn compare_for_display(a: &Item, b: &Item) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| item_key(a).to_lowercase().cmp(&item_key(b).to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Folder, Request, ScriptFile};

    #[test]
    fn safe_id_slugifies() {
        assert_eq!(safe_id("Get User"), "get-user");
        assert_eq!(safe_id("  Users / Admin  "), "users-admin");
        assert_eq!(safe_id("snake_case-ok"), "snake_case-ok");
        assert_eq!(safe_id("---a---b---"), "a-b");
        assert_eq!(safe_id("Ünïcode"), "n-code");
    }

    #[test]
    fn safe_id_falls_back_only_for_empty_input() {
        assert_eq!(safe_id(""), UNNAMED);
        assert_eq!(safe_id("!!!"), "");
        assert_eq!(safe_id(" - "), "");
    }

    #[test]
    fn item_key_prefers_ids() {
        let request: Item = Request::new("req-1", "Fetch").into();
        assert_eq!(item_key(&request), "req-1");

        let folder: Item = Folder::new("Users").with_id("fld-1").into();
        assert_eq!(item_key(&folder), "fld-1");

        let unnamed_folder: Item = Folder::new("Users").into();
        assert_eq!(item_key(&unnamed_folder), "Users");

        let script: Item = ScriptFile { script: None }.into();
        assert_eq!(item_key(&script), UNNAMED);
    }

    #[test]
    fn section_id_nests_under_parent() {
        let folder: Item = Folder::new("Admin Tools").into();
        assert_eq!(section_id(&folder, None), "admin-tools");
        assert_eq!(section_id(&folder, Some("API v2")), "api-v2-admin-tools");
        assert_eq!(section_id(&folder, Some("")), "admin-tools");
    }

    #[test]
    fn folders_sort_first_then_by_key() {
        let mut items: Vec<Item> = vec![
            Request::new("b-req", "b").into(),
            Folder::new("zeta").into(),
            Request::new("A-req", "a").into(),
            Folder::new("Alpha").into(),
        ];
        sort_folders_first(&mut items);
        let keys: Vec<_> = items.iter().map(item_key).collect();
        assert_eq!(keys, vec!["Alpha", "zeta", "A-req", "b-req"]);
    }

    #[test]
    fn sort_compares_lowercased_bytes() {
        let mut items: Vec<Item> = vec![
            Request::new("Élan", "e-acute").into(),
            Request::new("zed", "z").into(),
            Request::new("Eve", "e").into(),
        ];
        sort_folders_first(&mut items);
        let keys: Vec<_> = items.iter().map(item_key).collect();
        assert_eq!(keys, vec!["Eve", "zed", "Élan"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut items: Vec<Item> = vec![
            Request::new("same", "first").into(),
            Request::new("SAME", "second").into(),
        ];
        sort_folders_first(&mut items);
        let names: Vec<_> = items.iter().filter_map(Item::name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
