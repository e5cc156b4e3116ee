//! `PostgreSQL`-backed [`Repository`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{DocumentId, MenuItem, Outlet, Record, Room, Roommate, User};
use super::queries;
use super::repository::{Repository, StoreResult};

/// Repository over a shared connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close the underlying pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: User) -> StoreResult<Record<User>> {
        Ok(queries::insert_user(&self.pool, user).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<Record<User>>> {
        Ok(queries::list_users(&self.pool).await?)
    }

    async fn find_user(&self, id: DocumentId) -> StoreResult<Option<Record<User>>> {
        Ok(queries::find_user_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Record<User>>> {
        Ok(queries::find_user_by_email(&self.pool, email).await?)
    }

    async fn create_outlet(&self, outlet: Outlet) -> StoreResult<Record<Outlet>> {
        Ok(queries::insert_outlet(&self.pool, outlet).await?)
    }

    async fn list_outlets(&self) -> StoreResult<Vec<Record<Outlet>>> {
        Ok(queries::list_outlets(&self.pool).await?)
    }

    async fn find_outlet(&self, id: DocumentId) -> StoreResult<Option<Record<Outlet>>> {
        Ok(queries::find_outlet_by_id(&self.pool, id).await?)
    }

    async fn create_menu_item(&self, item: MenuItem) -> StoreResult<Record<MenuItem>> {
        Ok(queries::insert_menu_item(&self.pool, item).await?)
    }

    async fn list_menu_items(&self) -> StoreResult<Vec<Record<MenuItem>>> {
        Ok(queries::list_menu_items(&self.pool).await?)
    }

    async fn find_menu_item(&self, id: DocumentId) -> StoreResult<Option<Record<MenuItem>>> {
        Ok(queries::find_menu_item_by_id(&self.pool, id).await?)
    }

    async fn create_room(&self, room: Room) -> StoreResult<Record<Room>> {
        Ok(queries::insert_room(&self.pool, room).await?)
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Record<Room>>> {
        Ok(queries::list_rooms(&self.pool).await?)
    }

    async fn find_room(&self, id: DocumentId) -> StoreResult<Option<Record<Room>>> {
        Ok(queries::find_room_by_id(&self.pool, id).await?)
    }

    async fn create_roommate(&self, roommate: Roommate) -> StoreResult<Record<Roommate>> {
        Ok(queries::insert_roommate(&self.pool, roommate).await?)
    }

    async fn list_roommates(&self) -> StoreResult<Vec<Record<Roommate>>> {
        Ok(queries::list_roommates(&self.pool).await?)
    }

    async fn find_roommate(&self, id: DocumentId) -> StoreResult<Option<Record<Roommate>>> {
        Ok(queries::find_roommate_by_id(&self.pool, id).await?)
    }
}
