//! Construction of the owner-scoped predicate behind `GET /links`.
//!
//! Every list query starts from the caller's identity and narrows from there:
//! an optional tag-containment clause and an optional search OR-group over
//! title, description, and url, always joined by AND. The builder returns the
//! SQL and its bind values together so the shape can be tested without a
//! database.

/// Optional narrowing criteria for a link listing.
#[derive(Debug, Default)]
pub struct LinkFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
}

pub struct LinkQuery {
    pub sql: String,
    pub binds: Vec<String>,
}

/// Build the scoped SELECT for a link listing, newest first.
///
/// Empty-string parameters are treated as absent. The tag is matched against
/// the stored lower-cased entries, so the input is lower-cased here; the
/// search needle is lower-cased to pair with the `lower()` calls in the SQL.
pub fn build_list_query(user_id: &str, filter: &LinkFilter) -> LinkQuery {
    let mut sql = String::from("SELECT * FROM links WHERE user_id = ?");
    let mut binds = vec![user_id.to_string()];

    if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM json_each(links.tags) WHERE json_each.value = ?)",
        );
        binds.push(tag.to_lowercase());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND (instr(lower(title), ?) > 0 OR instr(lower(description), ?) > 0 OR instr(lower(url), ?) > 0)",
        );
        let needle = search.to_lowercase();
        binds.push(needle.clone());
        binds.push(needle.clone());
        binds.push(needle);
    }

    sql.push_str(" ORDER BY created_at DESC");

    LinkQuery { sql, binds }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_scopes_by_owner_only() {
        let q = build_list_query("u1", &LinkFilter::default());
        assert_eq!(
            q.sql,
            "SELECT * FROM links WHERE user_id = ? ORDER BY created_at DESC"
        );
        assert_eq!(q.binds, vec!["u1"]);
    }

    #[test]
    fn tag_filter_adds_containment_clause() {
        let filter = LinkFilter {
            tag: Some("Rust".to_string()),
            search: None,
        };
        let q = build_list_query("u1", &filter);
        assert!(q.sql.contains("json_each(links.tags)"));
        assert_eq!(q.binds, vec!["u1", "rust"]);
    }

    #[test]
    fn search_filter_adds_or_group_over_three_fields() {
        let filter = LinkFilter {
            tag: None,
            search: Some("Example".to_string()),
        };
        let q = build_list_query("u1", &filter);
        assert!(q.sql.contains("instr(lower(title), ?)"));
        assert!(q.sql.contains("instr(lower(description), ?)"));
        assert!(q.sql.contains("instr(lower(url), ?)"));
        assert_eq!(q.binds, vec!["u1", "example", "example", "example"]);
    }

    #[test]
    fn tag_and_search_combine_by_and() {
        let filter = LinkFilter {
            tag: Some("db".to_string()),
            search: Some("sql".to_string()),
        };
        let q = build_list_query("u1", &filter);
        let tag_pos = q.sql.find("json_each").unwrap();
        let search_pos = q.sql.find("instr").unwrap();
        assert!(tag_pos < search_pos);
        assert!(q.sql.contains(") AND ("));
        assert_eq!(q.binds, vec!["u1", "db", "sql", "sql", "sql"]);
    }

    #[test]
    fn empty_string_parameters_are_ignored() {
        let filter = LinkFilter {
            tag: Some(String::new()),
            search: Some(String::new()),
        };
        let q = build_list_query("u1", &filter);
        assert_eq!(
            q.sql,
            "SELECT * FROM links WHERE user_id = ? ORDER BY created_at DESC"
        );
        assert_eq!(q.binds, vec!["u1"]);
    }

    #[test]
    fn ordering_is_newest_first() {
        let q = build_list_query("u1", &LinkFilter::default());
        assert!(q.sql.ends_with("ORDER BY created_at DESC"));
    }
}
