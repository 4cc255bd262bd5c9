//! Statements built from the configured schema descriptor.
//!
//! Every SELECT aliases its columns to fixed names (`id`, `name`,
//! `updated_at`, ...) so row decoding never depends on the configuration.

use filevault_core::config::{DatabaseDriver, SchemaConfig};
use filevault_core::types::{Category, CategoryId, File, FileId, User, UserId};

use super::statement::Statement;

/// Composes every SQL statement the repository issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    schema: SchemaConfig,
    driver: DatabaseDriver,
}

impl QueryBuilder {
    pub fn new(schema: SchemaConfig, driver: DatabaseDriver) -> Self {
        Self { schema, driver }
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn driver(&self) -> DatabaseDriver {
        self.driver
    }

    /// Table name, qualified with the schema name when one is configured.
    ///
    /// SQLite has no schemas; the qualifier is dropped there.
    pub(crate) fn qualified(&self, table: &str) -> String {
        if self.schema.name.is_empty() || self.driver == DatabaseDriver::Sqlite {
            table.to_string()
        } else {
            format!("{}.{}", self.schema.name, table)
        }
    }

    pub(crate) fn users(&self) -> String {
        self.qualified(&self.schema.user_table.name)
    }

    pub(crate) fn categories(&self) -> String {
        self.qualified(&self.schema.categ_table.name)
    }

    pub(crate) fn files(&self) -> String {
        self.qualified(&self.schema.file_table.name)
    }

    // ── Users ──────────────────────────────────────────────────────────

    pub fn insert_user(&self, user: &User, password_hash: &str) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "INSERT INTO {} ({}, {}, {}, {}) VALUES (:user_id, :name, :password, :updated_at)",
            self.users(),
            c.user_id,
            c.name,
            c.password,
            c.updated_at
        ))
        .bind("user_id", user.id)
        .bind("name", user.name.as_str())
        .bind("password", password_hash)
        .bind("updated_at", user.updated_at)
    }

    /// UPDATE only the columns that changed, plus `updated_at`.
    ///
    /// A new password hash is always written when supplied; salted hashes
    /// never compare equal.
    pub fn update_user(&self, old: &User, new: &User, password_hash: Option<&str>) -> Statement {
        let c = &self.schema.user_table.columns;
        let mut sets = Vec::new();
        let mut stmt = Statement::new(String::new());

        if new.name != old.name {
            sets.push(format!("{} = :name", c.name));
            stmt = stmt.bind("name", new.name.as_str());
        }
        if let Some(hash) = password_hash {
            sets.push(format!("{} = :password", c.password));
            stmt = stmt.bind("password", hash);
        }
        sets.push(format!("{} = :updated_at", c.updated_at));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = :user_id",
            self.users(),
            sets.join(", "),
            c.user_id
        );
        stmt.with_sql(sql)
            .bind("updated_at", new.updated_at)
            .bind("user_id", old.id)
    }

    pub fn delete_user(&self, id: UserId) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "DELETE FROM {} WHERE {} = :user_id",
            self.users(),
            c.user_id
        ))
        .bind("user_id", id)
    }

    pub fn select_all_users(&self) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "SELECT {} AS id, {} AS name, {} AS updated_at FROM {}",
            c.user_id,
            c.name,
            c.updated_at,
            self.users()
        ))
    }

    pub fn select_user_by_id(&self, id: UserId) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "SELECT {} AS id, {} AS name, {} AS updated_at FROM {} WHERE {} = :user_id",
            c.user_id,
            c.name,
            c.updated_at,
            self.users(),
            c.user_id
        ))
        .bind("user_id", id)
    }

    /// Candidate rows for login, including the password hash.
    pub fn select_credentials_by_name(&self, name: &str) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "SELECT {} AS id, {} AS name, {} AS password FROM {} WHERE {} = :name",
            c.user_id,
            c.name,
            c.password,
            self.users(),
            c.name
        ))
        .bind("name", name)
    }

    /// Ids of every user carrying `name`.
    pub fn select_user_ids_by_name(&self, name: &str) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "SELECT {} AS id FROM {} WHERE {} = :name",
            c.user_id,
            self.users(),
            c.name
        ))
        .bind("name", name)
    }

    /// Reset only the password of a user (admin CLI).
    pub fn update_user_password(&self, id: UserId, password_hash: &str, now: i64) -> Statement {
        let c = &self.schema.user_table.columns;
        Statement::new(format!(
            "UPDATE {} SET {} = :password, {} = :updated_at WHERE {} = :user_id",
            self.users(),
            c.password,
            c.updated_at,
            c.user_id
        ))
        .bind("password", password_hash)
        .bind("updated_at", now)
        .bind("user_id", id)
    }

    // ── Categories ─────────────────────────────────────────────────────

    pub fn insert_category(&self, category: &Category) -> Statement {
        let c = &self.schema.categ_table.columns;
        Statement::new(format!(
            "INSERT INTO {} ({}, {}, {}, {}) VALUES (:categ_id, :user_id, :name, :updated_at)",
            self.categories(),
            c.categ_id,
            c.user_id,
            c.name,
            c.updated_at
        ))
        .bind("categ_id", category.id)
        .bind("user_id", category.user_id)
        .bind("name", category.name.as_str())
        .bind("updated_at", category.updated_at)
    }

    pub fn update_category(&self, old: &Category, new: &Category) -> Statement {
        let c = &self.schema.categ_table.columns;
        let mut sets = Vec::new();
        let mut stmt = Statement::new(String::new());

        if new.user_id != old.user_id {
            sets.push(format!("{} = :user_id", c.user_id));
            stmt = stmt.bind("user_id", new.user_id);
        }
        if new.name != old.name {
            sets.push(format!("{} = :name", c.name));
            stmt = stmt.bind("name", new.name.as_str());
        }
        sets.push(format!("{} = :updated_at", c.updated_at));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = :categ_id",
            self.categories(),
            sets.join(", "),
            c.categ_id
        );
        stmt.with_sql(sql)
            .bind("updated_at", new.updated_at)
            .bind("categ_id", old.id)
    }

    pub fn delete_category(&self, id: CategoryId) -> Statement {
        let c = &self.schema.categ_table.columns;
        Statement::new(format!(
            "DELETE FROM {} WHERE {} = :categ_id",
            self.categories(),
            c.categ_id
        ))
        .bind("categ_id", id)
    }

    fn category_columns(&self) -> String {
        let c = &self.schema.categ_table.columns;
        format!(
            "{} AS id, {} AS user_id, {} AS name, {} AS updated_at",
            c.categ_id, c.user_id, c.name, c.updated_at
        )
    }

    pub fn select_categories_by_user(&self, user_id: UserId) -> Statement {
        let c = &self.schema.categ_table.columns;
        Statement::new(format!(
            "SELECT {} FROM {} WHERE {} = :user_id",
            self.category_columns(),
            self.categories(),
            c.user_id
        ))
        .bind("user_id", user_id)
    }

    pub fn select_category_by_id(&self, id: CategoryId) -> Statement {
        let c = &self.schema.categ_table.columns;
        Statement::new(format!(
            "SELECT {} FROM {} WHERE {} = :categ_id",
            self.category_columns(),
            self.categories(),
            c.categ_id
        ))
        .bind("categ_id", id)
    }

    // ── Files ──────────────────────────────────────────────────────────

    pub fn insert_file(&self, file: &File) -> Statement {
        let c = &self.schema.file_table.columns;
        Statement::new(format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}) \
             VALUES (:file_id, :categ_id, :name, :extension, :mimetype, :updated_at)",
            self.files(),
            c.file_id,
            c.categ_id,
            c.name,
            c.extension,
            c.mimetype,
            c.updated_at
        ))
        .bind("file_id", file.id)
        .bind("categ_id", file.categ_id)
        .bind("name", file.name.as_str())
        .bind("extension", file.extension.as_str())
        .bind("mimetype", file.mimetype.as_str())
        .bind("updated_at", file.updated_at)
    }

    pub fn update_file(&self, old: &File, new: &File) -> Statement {
        let c = &self.schema.file_table.columns;
        let mut sets = Vec::new();
        let mut stmt = Statement::new(String::new());

        if new.categ_id != old.categ_id {
            sets.push(format!("{} = :categ_id", c.categ_id));
            stmt = stmt.bind("categ_id", new.categ_id);
        }
        if new.name != old.name {
            sets.push(format!("{} = :name", c.name));
            stmt = stmt.bind("name", new.name.as_str());
        }
        if new.extension != old.extension {
            sets.push(format!("{} = :extension", c.extension));
            stmt = stmt.bind("extension", new.extension.as_str());
        }
        if new.mimetype != old.mimetype {
            sets.push(format!("{} = :mimetype", c.mimetype));
            stmt = stmt.bind("mimetype", new.mimetype.as_str());
        }
        sets.push(format!("{} = :updated_at", c.updated_at));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = :file_id",
            self.files(),
            sets.join(", "),
            c.file_id
        );
        stmt.with_sql(sql)
            .bind("updated_at", new.updated_at)
            .bind("file_id", old.id)
    }

    pub fn delete_file(&self, id: FileId) -> Statement {
        let c = &self.schema.file_table.columns;
        Statement::new(format!(
            "DELETE FROM {} WHERE {} = :file_id",
            self.files(),
            c.file_id
        ))
        .bind("file_id", id)
    }

    fn file_columns(&self) -> String {
        let c = &self.schema.file_table.columns;
        format!(
            "{} AS id, {} AS categ_id, {} AS name, {} AS extension, {} AS mimetype, {} AS updated_at",
            c.file_id, c.categ_id, c.name, c.extension, c.mimetype, c.updated_at
        )
    }

    pub fn select_files_by_category(&self, categ_id: CategoryId) -> Statement {
        let c = &self.schema.file_table.columns;
        Statement::new(format!(
            "SELECT {} FROM {} WHERE {} = :categ_id",
            self.file_columns(),
            self.files(),
            c.categ_id
        ))
        .bind("categ_id", categ_id)
    }

    pub fn select_file_by_id(&self, id: FileId) -> Statement {
        let c = &self.schema.file_table.columns;
        Statement::new(format!(
            "SELECT {} FROM {} WHERE {} = :file_id",
            self.file_columns(),
            self.files(),
            c.file_id
        ))
        .bind("file_id", id)
    }

    // ── Schema checks ──────────────────────────────────────────────────

    /// One zero-row SELECT per table naming every configured column.
    ///
    /// Running these fails if any table or column is missing.
    pub fn schema_checks(&self) -> Vec<Statement> {
        let u = &self.schema.user_table.columns;
        let c = &self.schema.categ_table.columns;
        let f = &self.schema.file_table.columns;
        vec![
            Statement::new(format!(
                "SELECT {}, {}, {}, {} FROM {} WHERE 1 = 0",
                u.user_id,
                u.name,
                u.password,
                u.updated_at,
                self.users()
            )),
            Statement::new(format!(
                "SELECT {}, {}, {}, {} FROM {} WHERE 1 = 0",
                c.categ_id,
                c.user_id,
                c.name,
                c.updated_at,
                self.categories()
            )),
            Statement::new(format!(
                "SELECT {}, {}, {}, {}, {}, {} FROM {} WHERE 1 = 0",
                f.file_id,
                f.categ_id,
                f.name,
                f.extension,
                f.mimetype,
                f.updated_at,
                self.files()
            )),
        ]
    }
}
