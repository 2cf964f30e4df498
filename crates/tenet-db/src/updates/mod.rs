//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL. The serialized
//! update (changed fields only) becomes the `changes` payload of the audit
//! entry that accompanies it.

pub mod organization;
pub mod project;
pub mod task;

/// Accumulates `SET` clauses and positional parameters for a dynamic UPDATE.
#[derive(Default)]
pub(crate) struct SetClauses {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClauses {
    pub(crate) fn push(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn push_opt(&mut self, column: &str, value: Option<String>) {
        self.push(column, value.map_or(libsql::Value::Null, libsql::Value::Text));
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET ... WHERE id = ?n`.
    pub(crate) fn into_sql(mut self, table: &str, id: &str) -> (String, Vec<libsql::Value>) {
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}
