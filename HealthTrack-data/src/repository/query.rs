/// Time-window and paging options shared by the record repositories.
///
/// `start` and `end` are inclusive bounds in the same RFC 3339 UTC format the
/// rows are stored in, so they compare correctly as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_desc: bool,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            limit: None,
            offset: None,
            sort_desc: true,
        }
    }
}

impl RecordQuery {
    /// Unpaged query over `[start, ∞)`, oldest first
    pub fn since(start: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            sort_desc: false,
            ..Self::default()
        }
    }
}

/// WHERE clause and positional parameters for a user-scoped record query
pub(crate) struct FilterClause {
    pub sql: String,
    pub params: Vec<String>,
}

impl FilterClause {
    pub fn new(user_id: &str, time_column: &str, query: &RecordQuery) -> Self {
        let mut clauses = vec!["user_id = ?".to_string()];
        let mut params = vec![user_id.to_string()];

        if let Some(start) = &query.start {
            clauses.push(format!("{} >= ?", time_column));
            params.push(start.clone());
        }

        if let Some(end) = &query.end {
            clauses.push(format!("{} <= ?", time_column));
            params.push(end.clone());
        }

        Self {
            sql: format!(" WHERE {}", clauses.join(" AND ")),
            params,
        }
    }
}

/// ORDER BY / LIMIT / OFFSET suffix
pub(crate) fn order_and_page(time_column: &str, query: &RecordQuery) -> String {
    let direction = if query.sort_desc { "DESC" } else { "ASC" };
    let mut sql = format!(" ORDER BY {} {}", time_column, direction);

    match query.limit {
        Some(limit) => sql.push_str(&format!(" LIMIT {}", limit)),
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded
        None => sql.push_str(" LIMIT -1"),
    }

    sql.push_str(&format!(" OFFSET {}", query.offset.unwrap_or(0)));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_includes_bounds() {
        let query = RecordQuery {
            start: Some("2024-01-01T00:00:00Z".to_string()),
            end: Some("2024-01-31T23:59:59Z".to_string()),
            ..RecordQuery::default()
        };
        let clause = FilterClause::new("user-1", "timestamp", &query);
        assert_eq!(clause.sql, " WHERE user_id = ? AND timestamp >= ? AND timestamp <= ?");
        assert_eq!(clause.params.len(), 3);
    }

    #[test]
    fn test_order_and_page() {
        let query = RecordQuery {
            limit: Some(10),
            offset: Some(20),
            sort_desc: false,
            ..RecordQuery::default()
        };
        assert_eq!(order_and_page("timestamp", &query), " ORDER BY timestamp ASC LIMIT 10 OFFSET 20");
        assert_eq!(
            order_and_page("recorded_at", &RecordQuery::default()),
            " ORDER BY recorded_at DESC LIMIT -1 OFFSET 0"
        );
    }
}
