//! `CREATE TABLE` statements derived from the schema descriptor.
//!
//! Ids are stored as text and `updated_at` as Unix seconds so that the same
//! DDL is accepted by PostgreSQL and SQLite. Foreign keys are checked at
//! commit, which is where the coordinator expects database failures after
//! its filesystem step.

use filevault_core::config::DatabaseDriver;

use super::queries::QueryBuilder;
use super::statement::Statement;

impl QueryBuilder {
    /// Statements creating the schema (PostgreSQL only) and the three tables.
    ///
    /// Every statement is idempotent.
    pub fn ddl(&self) -> Vec<Statement> {
        let schema = self.schema();
        let u = &schema.user_table.columns;
        let c = &schema.categ_table.columns;
        let f = &schema.file_table.columns;

        let mut statements = Vec::with_capacity(4);
        if self.driver() == DatabaseDriver::Postgres && !schema.name.is_empty() {
            statements.push(Statement::new(format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                schema.name
            )));
        }

        statements.push(Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             {} TEXT PRIMARY KEY, \
             {} TEXT NOT NULL UNIQUE, \
             {} TEXT NOT NULL, \
             {} BIGINT NOT NULL)",
            self.users(),
            u.user_id,
            u.name,
            u.password,
            u.updated_at
        )));

        statements.push(Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             {} TEXT PRIMARY KEY, \
             {} TEXT NOT NULL REFERENCES {} ({}) DEFERRABLE INITIALLY DEFERRED, \
             {} TEXT NOT NULL, \
             {} BIGINT NOT NULL)",
            self.categories(),
            c.categ_id,
            c.user_id,
            self.users(),
            u.user_id,
            c.name,
            c.updated_at
        )));

        statements.push(Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             {} TEXT PRIMARY KEY, \
             {} TEXT NOT NULL REFERENCES {} ({}) DEFERRABLE INITIALLY DEFERRED, \
             {} TEXT NOT NULL, \
             {} TEXT NOT NULL, \
             {} TEXT NOT NULL, \
             {} BIGINT NOT NULL)",
            self.files(),
            f.file_id,
            f.categ_id,
            self.categories(),
            c.categ_id,
            f.name,
            f.extension,
            f.mimetype,
            f.updated_at
        )));

        statements
    }
}
