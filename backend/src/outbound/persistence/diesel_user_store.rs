//! SQLite-backed `UserStore` implementation using Diesel ORM.
//!
//! This adapter implements the domain's [`UserStore`] port. It only translates
//! between Diesel rows and domain types; uniqueness is enforced by the
//! table's `UNIQUE` constraints and reported as [`UserStoreError::Duplicate`].

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{NewUser, User, UserId};

use super::database::Database;
use super::models::{NewUserRow, UserRow};
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl DieselUserStore {
    /// Create a new store over an open database, stamping inserts with `clock`.
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

/// Map Diesel errors to domain user store errors.
fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserStoreError::duplicate(info.message())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserStoreError::connection(info.message())
        }
        DieselError::DatabaseError(_, info) => UserStoreError::query(info.message()),
        other => UserStoreError::query(other.to_string()),
    }
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    let age = u8::try_from(row.age)
        .map_err(|_| UserStoreError::query(format!("stored age {} is out of range", row.age)))?;
    Ok(NewUser::from_validated(row.username, row.email, age)
        .into_user(UserId::new(row.id), row.created_at.and_utc()))
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
        let row = NewUserRow {
            username: user.username().to_owned(),
            email: user.email().to_owned(),
            age: i32::from(user.age()),
            created_at: self.clock.utc().naive_utc(),
        };

        let mut conn = self.db.connection().await;
        let stored = diesel::insert_into(users::table)
            .values(row)
            .returning(UserRow::as_returning())
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.db.connection().await;
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.db.connection().await;
        let row = users::table
            .filter(users::username.eq(username.to_owned()))
            .select(UserRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.db.connection().await;
        let rows: Vec<UserRow> = users::table
            .order((users::created_at.desc(), users::id.desc()))
            .select(UserRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool, UserStoreError> {
        let mut conn = self.db.connection().await;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn delete_all(&self) -> Result<u64, UserStoreError> {
        let mut conn = self.db.connection().await;
        let deleted = diesel::delete(users::table)
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(deleted, "cleared users table");
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    //! Adapter coverage against a real SQLite file.
    use super::*;
    use crate::domain::RegistrationRequest;
    use crate::domain::validation::validate;
    use crate::outbound::persistence::DbConfig;
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};
    use rstest::rstest;
    use std::path::Path;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    struct SteppingClock {
        start: DateTime<Utc>,
        ticks: AtomicI64,
    }

    impl Clock for SteppingClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::milliseconds(tick * 250)
        }
    }

    fn clock() -> Arc<dyn Clock> {
        let start = Utc
            .with_ymd_and_hms(2026, 2, 14, 8, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        Arc::new(SteppingClock {
            start,
            ticks: AtomicI64::new(0),
        })
    }

    async fn open_store(path: &Path) -> DieselUserStore {
        let db = Database::open(DbConfig::new(path)).await.expect("database opens");
        DieselUserStore::new(db, clock())
    }

    fn new_user(username: &str, email: &str, age: i64) -> NewUser {
        validate(&RegistrationRequest::new(username, email, age)).expect("fixture input validates")
    }

    #[rstest]
    #[tokio::test]
    async fn insert_round_trips_every_field() {
        let dir = TempDir::new().expect("temp dir");
        let store = open_store(&dir.path().join("users.db")).await;

        let created = store
            .insert(new_user("ada", "ada@example.com", 36))
            .await
            .expect("insert");
        let fetched = store
            .find_by_id(created.id())
            .await
            .expect("lookup")
            .expect("record present");

        assert_eq!(fetched, created);
        assert_eq!(fetched.username(), "ada");
        assert_eq!(fetched.email(), "ada@example.com");
        assert_eq!(fetched.age(), 36);
    }

    #[rstest]
    #[case("ada", "second@example.com")]
    #[case("second", "ada@example.com")]
    #[tokio::test]
    async fn unique_constraints_surface_as_duplicate(#[case] username: &str, #[case] email: &str) {
        let dir = TempDir::new().expect("temp dir");
        let store = open_store(&dir.path().join("users.db")).await;
        store
            .insert(new_user("ada", "ada@example.com", 36))
            .await
            .expect("insert");

        let err = store
            .insert(new_user(username, email, 40))
            .await
            .expect_err("duplicate rejected");

        assert!(matches!(err, UserStoreError::Duplicate { .. }));
        let original = store
            .find_by_username("ada")
            .await
            .expect("lookup")
            .expect("original kept");
        assert_eq!(original.email(), "ada@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn writes_survive_reopen_and_ids_are_not_reused() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("users.db");

        let first_id = {
            let store = open_store(&path).await;
            let user = store
                .insert(new_user("ada", "ada@example.com", 36))
                .await
                .expect("insert");
            assert!(store.delete_by_id(user.id()).await.expect("delete"));
            store
                .insert(new_user("grace", "grace@example.com", 45))
                .await
                .expect("insert")
                .id()
        };

        let reopened = open_store(&path).await;
        let survivor = reopened
            .find_by_username("grace")
            .await
            .expect("lookup")
            .expect("record survived reopen");
        assert_eq!(survivor.id(), first_id);

        let next = reopened
            .insert(new_user("ada", "ada@example.com", 36))
            .await
            .expect("insert");
        assert!(next.id() > first_id);
    }

    #[rstest]
    #[tokio::test]
    async fn list_all_orders_newest_first() {
        let dir = TempDir::new().expect("temp dir");
        let store = open_store(&dir.path().join("users.db")).await;
        for name in ["ada", "grace", "linus"] {
            store
                .insert(new_user(name, &format!("{name}@example.com"), 30))
                .await
                .expect("insert");
        }

        let names: Vec<String> = store
            .list_all()
            .await
            .expect("list")
            .iter()
            .map(|user| user.username().to_owned())
            .collect();
        assert_eq!(names, ["linus", "grace", "ada"]);
    }

    #[rstest]
    #[tokio::test]
    async fn deletes_are_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let store = open_store(&dir.path().join("users.db")).await;
        let user = store
            .insert(new_user("ada", "ada@example.com", 36))
            .await
            .expect("insert");

        assert!(store.delete_by_id(user.id()).await.expect("first delete"));
        assert!(!store.delete_by_id(user.id()).await.expect("second delete"));
        assert_eq!(store.delete_all().await.expect("delete all"), 0);
    }

    #[rstest]
    fn non_database_errors_map_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserStoreError::Query { .. }));
    }
}
