//! In-process [`Repository`] for tests.
//!
//! Keeps each entity in its own insertion-ordered collection and enforces the
//! same unique email key as the `users` table.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{DocumentId, MenuItem, Outlet, Record, Room, Roommate, User};
use super::repository::{Repository, StoreError, StoreResult};

/// One entity's records, oldest first.
#[derive(Debug)]
struct Collection<T> {
    records: RwLock<Vec<Record<T>>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Clone> Collection<T> {
    async fn insert(&self, body: T) -> Record<T> {
        let record = Record {
            id: DocumentId::generate(),
            body,
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        record
    }

    async fn all(&self) -> Vec<Record<T>> {
        self.records.read().await.clone()
    }

    async fn find(&self, id: DocumentId) -> Option<Record<T>> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Memory-backed repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: Collection<User>,
    outlets: Collection<Outlet>,
    menu_items: Collection<MenuItem>,
    rooms: Collection<Room>,
    roommates: Collection<Roommate>,
    lookups: AtomicUsize,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of by-id and by-email lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Total stored records across all entities.
    pub async fn record_count(&self) -> usize {
        self.users.len().await
            + self.outlets.len().await
            + self.menu_items.len().await
            + self.rooms.len().await
            + self.roommates.len().await
    }

    fn note_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: User) -> StoreResult<Record<User>> {
        // Hold the write lock across the uniqueness check and the insert.
        let mut users = self.users.records.write().await;
        if users.iter().any(|r| r.body.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".into()));
        }
        let record = Record {
            id: DocumentId::generate(),
            body: user,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn list_users(&self) -> StoreResult<Vec<Record<User>>> {
        Ok(self.users.all().await)
    }

    async fn find_user(&self, id: DocumentId) -> StoreResult<Option<Record<User>>> {
        self.note_lookup();
        Ok(self.users.find(id).await)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Record<User>>> {
        self.note_lookup();
        Ok(self
            .users
            .records
            .read()
            .await
            .iter()
            .find(|r| r.body.email == email)
            .cloned())
    }

    async fn create_outlet(&self, outlet: Outlet) -> StoreResult<Record<Outlet>> {
        Ok(self.outlets.insert(outlet).await)
    }

    async fn list_outlets(&self) -> StoreResult<Vec<Record<Outlet>>> {
        Ok(self.outlets.all().await)
    }

    async fn find_outlet(&self, id: DocumentId) -> StoreResult<Option<Record<Outlet>>> {
        self.note_lookup();
        Ok(self.outlets.find(id).await)
    }

    async fn create_menu_item(&self, item: MenuItem) -> StoreResult<Record<MenuItem>> {
        Ok(self.menu_items.insert(item).await)
    }

    async fn list_menu_items(&self) -> StoreResult<Vec<Record<MenuItem>>> {
        Ok(self.menu_items.all().await)
    }

    async fn find_menu_item(&self, id: DocumentId) -> StoreResult<Option<Record<MenuItem>>> {
        self.note_lookup();
        Ok(self.menu_items.find(id).await)
    }

    async fn create_room(&self, room: Room) -> StoreResult<Record<Room>> {
        Ok(self.rooms.insert(room).await)
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Record<Room>>> {
        Ok(self.rooms.all().await)
    }

    async fn find_room(&self, id: DocumentId) -> StoreResult<Option<Record<Room>>> {
        self.note_lookup();
        Ok(self.rooms.find(id).await)
    }

    async fn create_roommate(&self, roommate: Roommate) -> StoreResult<Record<Roommate>> {
        Ok(self.roommates.insert(roommate).await)
    }

    async fn list_roommates(&self) -> StoreResult<Vec<Record<Roommate>>> {
        Ok(self.roommates.all().await)
    }

    async fn find_roommate(&self, id: DocumentId) -> StoreResult<Option<Record<Roommate>>> {
        self.note_lookup();
        Ok(self.roommates.find(id).await)
    }
}
