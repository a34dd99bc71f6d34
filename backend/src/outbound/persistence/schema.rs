//! Diesel table definitions for the user registry database.
//!
//! The schema is created at startup by [`super::database::Database::open`]
//! with `CREATE TABLE IF NOT EXISTS`; these definitions must be kept in step
//! with that DDL by hand.

diesel::table! {
    /// Registered users.
    ///
    /// `id` is an `AUTOINCREMENT` rowid, so SQLite never hands out an id that
    /// belonged to a deleted row.
    users (id) {
        /// Primary key assigned by SQLite.
        id -> BigInt,
        /// Unique username.
        username -> Text,
        /// Unique email address.
        email -> Text,
        /// Age in years, validated before insert.
        age -> Integer,
        /// Insert timestamp in UTC.
        created_at -> Timestamp,
    }
}
