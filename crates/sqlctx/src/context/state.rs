//! The pooled part of a builder context and the statement assembly over it.

use crate::error::{DbError, DbResult};
use crate::sql::{self, GROUPING, SEQ_COMMA, SEQ_SPACE};
use crate::value::Value;

/// Accumulated query fragments.
///
/// Allocated once by the pool, reset on every acquire and release. Holds no
/// borrows so it can sit in the pool between uses; the database and
/// transaction handles live on [`Context`](super::Context) instead.
#[derive(Debug, Default)]
pub(crate) struct ContextState {
    /// Stable allocation id.
    pub(crate) id: u64,
    /// Caller-supplied statement; wins over the built fields.
    pub(crate) raw_sql: Option<String>,
    pub(crate) table: String,
    pub(crate) what: Vec<String>,
    pub(crate) wheres: Vec<String>,
    pub(crate) order: String,
    pub(crate) group: String,
    pub(crate) having: String,
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    /// Filter and having parameters, in declaration order.
    pub(crate) args: Vec<Value>,
    /// `for update`
    pub(crate) lock_x: bool,
    /// `lock in share mode`
    pub(crate) lock_s: bool,
    /// First malformed input seen by a configuration method.
    pub(crate) build_error: Option<DbError>,
}

impl ContextState {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Back to the empty state. Buffers keep their capacity.
    pub(crate) fn reset(&mut self) {
        self.raw_sql = None;
        self.table.clear();
        self.what.clear();
        self.wheres.clear();
        self.order.clear();
        self.group.clear();
        self.having.clear();
        self.limit = 0;
        self.offset = 0;
        self.args.clear();
        self.lock_x = false;
        self.lock_s = false;
        self.build_error = None;
    }

    pub(crate) fn is_pristine(&self) -> bool {
        self.raw_sql.is_none()
            && self.table.is_empty()
            && self.what.is_empty()
            && self.wheres.is_empty()
            && self.order.is_empty()
            && self.group.is_empty()
            && self.having.is_empty()
            && self.limit == 0
            && self.offset == 0
            && self.args.is_empty()
            && !self.lock_x
            && !self.lock_s
            && self.build_error.is_none()
    }

    /// Keep the first error; later ones are usually consequences of it.
    pub(crate) fn record_error(&mut self, err: DbError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    pub(crate) fn take_build_error(&mut self) -> DbResult<()> {
        match self.build_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn push_where(&mut self, filter: String, params: impl IntoIterator<Item = Value>) {
        self.wheres.push(filter);
        self.args.extend(params);
    }

    pub(crate) fn where_sql(&self) -> String {
        sql::where_clause(&self.wheres, GROUPING)
    }

    /// `select … from … [where] [group by] [having] [order by] [limit] [lock]`.
    ///
    /// `inferred` is the destination's column mapping, used only when no
    /// projection was set.
    pub(crate) fn select_sql(&self, inferred: &[&str]) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(10);
        parts.push("select".to_string());
        if !self.what.is_empty() {
            parts.push(sql::join(&self.what, SEQ_COMMA));
        } else if !inferred.is_empty() {
            parts.push(sql::join(inferred, SEQ_COMMA));
        } else {
            parts.push("*".to_string());
        }
        parts.push(format!("from {}", self.table));

        if !self.wheres.is_empty() {
            parts.push(self.where_sql());
        }
        if !self.group.is_empty() {
            parts.push(format!("group by {}", self.group));
        }
        if !self.having.is_empty() {
            parts.push(format!("having {}", self.having));
        }
        if !self.order.is_empty() {
            parts.push(format!("order by {}", self.order));
        }
        if self.limit != 0 {
            parts.push(format!("limit {}, {}", self.offset, self.limit));
        }
        // Both flags set is a caller error; both clauses are emitted as-is.
        if self.lock_s {
            parts.push("lock in share mode".to_string());
        }
        if self.lock_x {
            parts.push("for update".to_string());
        }
        sql::join(&parts, SEQ_SPACE)
    }

    /// `insert into <table> (<fields>) values (?, …), …` and its row-major params.
    pub(crate) fn insert_sql(
        &self,
        fields: &[String],
        rows: Vec<Vec<Value>>,
    ) -> DbResult<(String, Vec<Value>)> {
        if fields.is_empty() {
            return Err(DbError::malformed("insert needs at least one field"));
        }
        if rows.is_empty() {
            return Err(DbError::malformed("insert needs at least one row"));
        }

        let mut params = Vec::with_capacity(fields.len() * rows.len());
        let mut groups = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != fields.len() {
                return Err(DbError::RowLength {
                    row: idx,
                    expected: fields.len(),
                    got: row.len(),
                });
            }
            groups.push(sql::placeholder_group(row.len()));
            params.extend(row);
        }

        let query = format!(
            "insert into {} ({}) values {}",
            self.table,
            sql::join(fields, SEQ_COMMA),
            sql::join(&groups, SEQ_COMMA)
        );
        Ok((query, params))
    }

    /// `update <table> set <clause> <where>`; own args precede filter args.
    pub(crate) fn update_sql(&mut self, set_clause: &str, args: Vec<Value>) -> (String, Vec<Value>) {
        let query = format!("update {} set {} {}", self.table, set_clause, self.where_sql());
        let mut params = args;
        params.append(&mut self.args);
        (query, params)
    }

    /// `delete from <table> <where>`.
    pub(crate) fn delete_sql(&mut self) -> (String, Vec<Value>) {
        let query = format!("delete from {} {}", self.table, self.where_sql());
        (query, std::mem::take(&mut self.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn state(table: &str) -> ContextState {
        let mut state = ContextState::new(1);
        state.table = table.to_string();
        state
    }

    #[test]
    fn test_select_star_without_mapping() {
        assert_eq!(state("users").select_sql(&[]), "select * from users");
    }

    #[test]
    fn test_select_uses_inferred_columns() {
        assert_eq!(
            state("users").select_sql(&["id", "name"]),
            "select id, name from users"
        );
    }

    #[test]
    fn test_explicit_projection_wins() {
        let mut s = state("users");
        s.what = vec!["count(id) as total".to_string()];
        assert_eq!(
            s.select_sql(&["id", "name"]),
            "select count(id) as total from users"
        );
    }

    #[test]
    fn test_full_clause_order() {
        let mut s = state("users");
        s.what = vec!["name".into(), "sum(age) as age".into()];
        s.push_where("age > ?".into(), params![10]);
        s.push_where("name like ?".into(), params!["a%"]);
        s.group = "name".into();
        s.having = "age > ?".into();
        s.args.push(Value::Int(18));
        s.order = "age desc".into();
        s.limit = 2;
        s.offset = 1;
        s.lock_x = true;

        assert_eq!(
            s.select_sql(&[]),
            "select name, sum(age) as age from users where age > ? and name like ? \
             group by name having age > ? order by age desc limit 1, 2 for update"
        );
        assert_eq!(s.args, params![10, "a%", 18]);
    }

    #[test]
    fn test_zero_limit_ignores_offset() {
        let mut s = state("users");
        s.offset = 30;
        assert_eq!(s.select_sql(&[]), "select * from users");
    }

    #[test]
    fn test_shared_lock() {
        let mut s = state("users");
        s.lock_s = true;
        assert_eq!(s.select_sql(&[]), "select * from users lock in share mode");
    }

    #[test]
    fn test_both_locks_emit_both_clauses() {
        let mut s = state("users");
        s.lock_s = true;
        s.lock_x = true;
        assert_eq!(
            s.select_sql(&[]),
            "select * from users lock in share mode for update"
        );
    }

    #[test]
    fn test_insert_batch_row_major() {
        let s = state("users");
        let fields = vec!["name".to_string(), "age".to_string()];
        let (sql, params) = s
            .insert_sql(&fields, vec![params!["a", 1], params!["b", 2]])
            .unwrap();

        assert_eq!(sql, "insert into users (name, age) values (?, ?), (?, ?)");
        assert_eq!(params, params!["a", 1, "b", 2]);
    }

    #[test]
    fn test_insert_row_length_mismatch() {
        let s = state("users");
        let fields = vec!["name".to_string(), "age".to_string()];
        let err = s
            .insert_sql(&fields, vec![params!["a", 1], params!["b"]])
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::RowLength {
                row: 1,
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_insert_requires_rows_and_fields() {
        let s = state("users");
        assert!(s.insert_sql(&[], vec![params![1]]).unwrap_err().is_malformed_input());
        assert!(
            s.insert_sql(&["a".to_string()], Vec::new())
                .unwrap_err()
                .is_malformed_input()
        );
    }

    #[test]
    fn test_update_own_args_first() {
        let mut s = state("users");
        s.push_where("id=?".into(), params![1]);
        let (sql, params) = s.update_sql("age=age+?", params![5]);

        assert_eq!(sql, "update users set age=age+? where id=?");
        assert_eq!(params, params![5, 1]);
    }

    #[test]
    fn test_delete_without_filter() {
        let mut s = state("users");
        let (sql, params) = s.delete_sql();
        assert_eq!(sql, "delete from users ");
        assert!(params.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = state("users");
        s.raw_sql = Some("select 1".into());
        s.what.push("id".into());
        s.push_where("id=?".into(), params![1]);
        s.order = "id".into();
        s.group = "id".into();
        s.having = "count(*) > 1".into();
        s.limit = 1;
        s.offset = 2;
        s.lock_s = true;
        s.lock_x = true;
        s.record_error(DbError::malformed("x"));
        assert!(!s.is_pristine());

        s.reset();
        assert!(s.is_pristine());
        assert_eq!(s.id, 1);
    }

    #[test]
    fn test_first_build_error_wins() {
        let mut s = state("users");
        s.record_error(DbError::malformed("first"));
        s.record_error(DbError::malformed("second"));
        let err = s.take_build_error().unwrap_err();
        assert_eq!(err.to_string(), "Malformed input: first");
        assert!(s.take_build_error().is_ok());
    }
}
