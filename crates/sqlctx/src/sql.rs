//! SQL fragment assembly.
//!
//! Pure string helpers; nothing here knows about parameters or drivers.

/// Connective between filter fragments.
pub const GROUPING: &str = " and ";
/// Positional parameter marker.
pub const PARAM_MARKER: &str = "?";
/// Separator for column and value lists.
pub const SEQ_COMMA: &str = ", ";
/// Separator between statement clauses.
pub const SEQ_SPACE: &str = " ";

/// Join fragments with `sep`.
pub fn join<S: AsRef<str>>(parts: &[S], sep: &str) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// `where a and b …`, or an empty string when there are no filters.
pub fn where_clause<S: AsRef<str>>(filters: &[S], grouping: &str) -> String {
    if filters.is_empty() {
        String::new()
    } else {
        format!("where {}", join(filters, grouping))
    }
}

/// `?, ?, ?` with `n` markers.
pub fn placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n * 3);
    for i in 0..n {
        if i > 0 {
            out.push_str(SEQ_COMMA);
        }
        out.push_str(PARAM_MARKER);
    }
    out
}

/// `(?, ?, ?)` with `n` markers.
pub fn placeholder_group(n: usize) -> String {
    format!("({})", placeholders(n))
}

/// `field in (?, ?, …)` with one marker per value.
pub fn in_clause(field: &str, n: usize) -> String {
    format!("{field} in ({})", placeholders(n))
}

/// `a=?, b=?` for an update SET clause.
pub fn set_clause<S: AsRef<str>>(columns: &[S]) -> String {
    let pairs: Vec<String> = columns
        .iter()
        .map(|c| format!("{}={PARAM_MARKER}", c.as_ref()))
        .collect();
    join(&pairs, SEQ_COMMA)
}

/// Truncate `sql` to at most `max` bytes without splitting a UTF-8 sequence.
pub(crate) fn truncate_sql_bytes(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
