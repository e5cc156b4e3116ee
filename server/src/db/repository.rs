//! Persistence port used by the request handlers.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{DocumentId, MenuItem, Outlet, Record, Room, Roommate, User};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key is already taken.
    #[error("Duplicate value violates `{0}`")]
    Duplicate(String),

    /// Storage-layer failure.
    #[error("Database error")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return Self::Duplicate(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Create, list and fetch-by-id for every entity. Records are never updated
/// or deleted.
///
/// Lookups take a [`DocumentId`], so malformed identifiers are rejected by the
/// caller before any storage access.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_user(&self, user: User) -> StoreResult<Record<User>>;
    /// Part of the per-entity contract; no route lists users or reads one by id.
    async fn list_users(&self) -> StoreResult<Vec<Record<User>>>;
    async fn find_user(&self, id: DocumentId) -> StoreResult<Option<Record<User>>>;
    /// Emails are stored lower-cased; callers pass the normalized form.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Record<User>>>;

    async fn create_outlet(&self, outlet: Outlet) -> StoreResult<Record<Outlet>>;
    async fn list_outlets(&self) -> StoreResult<Vec<Record<Outlet>>>;
    async fn find_outlet(&self, id: DocumentId) -> StoreResult<Option<Record<Outlet>>>;

    async fn create_menu_item(&self, item: MenuItem) -> StoreResult<Record<MenuItem>>;
    async fn list_menu_items(&self) -> StoreResult<Vec<Record<MenuItem>>>;
    async fn find_menu_item(&self, id: DocumentId) -> StoreResult<Option<Record<MenuItem>>>;

    async fn create_room(&self, room: Room) -> StoreResult<Record<Room>>;
    async fn list_rooms(&self) -> StoreResult<Vec<Record<Room>>>;
    async fn find_room(&self, id: DocumentId) -> StoreResult<Option<Record<Room>>>;

    async fn create_roommate(&self, roommate: Roommate) -> StoreResult<Record<Roommate>>;
    async fn list_roommates(&self) -> StoreResult<Vec<Record<Roommate>>>;
    async fn find_roommate(&self, id: DocumentId) -> StoreResult<Option<Record<Roommate>>>;
}
