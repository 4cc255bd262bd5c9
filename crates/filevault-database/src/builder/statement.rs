//! Named-parameter statements.
//!
//! Statements are written with `:name` binds. [`Statement::render`] rewrites
//! them to positional `$n` placeholders, numbered by first appearance, which
//! both PostgreSQL and SQLite accept. A name used twice maps to the same
//! position.

use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{CategoryId, FileId, UserId};

/// A value bound to a named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    BigInt(i64),
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<UserId> for BindValue {
    fn from(value: UserId) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<CategoryId> for BindValue {
    fn from(value: CategoryId) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<FileId> for BindValue {
    fn from(value: FileId) -> Self {
        Self::Text(value.to_string())
    }
}

/// SQL text with named binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    binds: Vec<(String, BindValue)>,
}

/// A statement rewritten to positional placeholders, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatement {
    pub sql: String,
    pub values: Vec<BindValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    /// Bind `value` to `:name`. Binding the same name again replaces it.
    pub fn bind(mut self, name: &str, value: impl Into<BindValue>) -> Self {
        let value = value.into();
        match self.binds.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.binds.push((name.to_string(), value)),
        }
        self
    }

    /// Replace the SQL text, keeping the binds collected so far.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = sql.into();
        self
    }

    /// The SQL text with named binds.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The value bound to `name`, if any.
    pub fn value(&self, name: &str) -> Option<&BindValue> {
        self.binds.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Rewrite `:name` binds to `$n` and order the values accordingly.
    ///
    /// Binds inside single-quoted literals and `::` casts are left alone.
    /// A placeholder without a bound value is an error.
    pub fn render(&self) -> AppResult<RenderedStatement> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut order: Vec<&str> = Vec::new();
        let mut in_literal = false;
        let mut prev: Option<char> = None;
        let mut chars = self.sql.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if ch == '\'' {
                in_literal = !in_literal;
            }

            let starts_bind = ch == ':'
                && !in_literal
                && prev != Some(':')
                && chars
                    .peek()
                    .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_');

            if !starts_bind {
                sql.push(ch);
                prev = Some(ch);
                continue;
            }

            let start = idx + 1;
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let name = &self.sql[start..end];
            let position = match order.iter().position(|n| *n == name) {
                Some(p) => p,
                None => {
                    order.push(name);
                    order.len() - 1
                }
            };
            sql.push('$');
            sql.push_str(&(position + 1).to_string());
            prev = name.chars().last();
        }

        let values = order
            .iter()
            .map(|name| {
                self.value(name).cloned().ok_or_else(|| {
                    AppError::internal(format!("No value bound for parameter ':{name}'"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(RenderedStatement { sql, values })
    }
}

impl RenderedStatement {
    /// Build an executable `sqlx` query borrowing this statement.
    pub fn query(&self) -> Query<'_, Any, AnyArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.values {
            query = match value {
                BindValue::Text(text) => query.bind(text.as_str()),
                BindValue::BigInt(int) => query.bind(*int),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_by_first_appearance() {
        let sql = "UPDATE t SET name = :name, updated_at = :updated_at WHERE id = :id";
        let stmt = Statement::new(sql)
            .bind("id", "abc")
            .bind("updated_at", 42i64)
            .bind("name", "alice");

        let rendered = stmt.render().unwrap();
        assert_eq!(
            rendered.sql,
            "UPDATE t SET name = $1, updated_at = $2 WHERE id = $3"
        );
        assert_eq!(
            rendered.values,
            vec![
                BindValue::Text("alice".into()),
                BindValue::BigInt(42),
                BindValue::Text("abc".into()),
            ]
        );
    }

    #[test]
    fn test_repeated_name_reuses_position() {
        let stmt = Statement::new("SELECT 1 FROM t WHERE a = :v OR b = :v").bind("v", 1i64);
        let rendered = stmt.render().unwrap();
        assert_eq!(rendered.sql, "SELECT 1 FROM t WHERE a = $1 OR b = $1");
        assert_eq!(rendered.values.len(), 1);
    }

    #[test]
    fn test_leaves_casts_and_literals_alone() {
        let stmt =
            Statement::new("SELECT x::text, ':not_a_bind' FROM t WHERE y = :y").bind("y", "1");
        let rendered = stmt.render().unwrap();
        assert_eq!(rendered.sql, "SELECT x::text, ':not_a_bind' FROM t WHERE y = $1");
    }

    #[test]
    fn test_missing_bind_is_an_error() {
        let err = Statement::new("DELETE FROM t WHERE id = :id").render().unwrap_err();
        assert!(err.message.contains(":id"));
    }

    #[test]
    fn test_rebinding_replaces_value() {
        let stmt = Statement::new("SELECT :a").bind("a", 1i64).bind("a", 2i64);
        assert_eq!(stmt.render().unwrap().values, vec![BindValue::BigInt(2)]);
    }
}
