//! Drive search query construction.
//!
//! Drive's `q` parameter is a small expression language; values are
//! single-quoted and must have backslashes and quotes escaped.

use driveport_core::traits::drive::{FOLDER_MIME_TYPE, ListQuery};

/// Escape a literal value for embedding in a Drive query string.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render the `q` expression for a listing call.
///
/// Trashed items are always excluded.
pub fn build(query: &ListQuery) -> String {
    let mut terms = vec!["trashed = false".to_string()];

    if let Some(parent_id) = &query.parent_id {
        terms.push(format!("'{}' in parents", escape(parent_id)));
    }
    if let Some(name) = &query.name_equals {
        terms.push(format!("name = '{}'", escape(name)));
    }
    if query.folders_only {
        terms.push(format!("mimeType = '{FOLDER_MIME_TYPE}'"));
    }

    terms.join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quotes_and_backslashes() {
        assert_eq!(escape("it's"), "it\\'s");
        assert_eq!(escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_build_full_query() {
        let query = ListQuery {
            parent_id: Some("folder1".into()),
            name_equals: Some("Q3 report".into()),
            folders_only: true,
            ..Default::default()
        };
        assert_eq!(
            build(&query),
            "trashed = false and 'folder1' in parents and name = 'Q3 report' \
             and mimeType = 'application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn test_build_minimal_query() {
        assert_eq!(build(&ListQuery::default()), "trashed = false");
    }
}
