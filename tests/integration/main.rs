//! End-to-end tests driving the HTTP router against a SQLite database and an
//! entity root in a temp directory.

mod helpers;

mod auth_test;
mod category_test;
mod file_test;
mod reload_test;
mod user_test;
