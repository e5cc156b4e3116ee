//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! Inserts bind a freshly generated id and return only the server-side
//! `created_at`; the record is assembled from the body that was written.
//! Reads go through `*Row` structs that map columns back into documents.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::error;

use super::models::{
    AccommodationType, Coordinates, DocumentId, Furnishing, Gender, MenuItem, Outlet,
    OutletOwner, OutletType, Record, Room, Roommate, StoredImage, User, UserType,
};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, FromRow)]
struct UserRow {
    id: DocumentId,
    name: String,
    email: String,
    password_hash: Option<String>,
    phone: String,
    user_type: UserType,
    address: Option<String>,
    organization: Option<String>,
    dob: Option<NaiveDate>,
    profile_picture_url: Option<String>,
    profile_picture_public_id: Option<String>,
    is_google_sign_up: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for Record<User> {
    fn from(row: UserRow) -> Self {
        let profile_picture = row
            .profile_picture_url
            .zip(row.profile_picture_public_id)
            .map(|(url, public_id)| StoredImage { url, public_id });

        Self {
            id: row.id,
            body: User {
                name: row.name,
                email: row.email,
                password_hash: row.password_hash,
                phone: row.phone,
                user_type: row.user_type,
                address: row.address,
                organization: row.organization,
                dob: row.dob,
                profile_picture,
                is_google_sign_up: row.is_google_sign_up,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OutletRow {
    id: DocumentId,
    outlet_name: String,
    location: String,
    phone: String,
    email: String,
    opening_hours: String,
    lat: f64,
    lng: f64,
    description: String,
    outlet_type: OutletType,
    user_type: OutletOwner,
    image_url: String,
    image_public_id: String,
    created_at: DateTime<Utc>,
}

impl From<OutletRow> for Record<Outlet> {
    fn from(row: OutletRow) -> Self {
        Self {
            id: row.id,
            body: Outlet {
                outlet_name: row.outlet_name,
                location: row.location,
                phone: row.phone,
                email: row.email,
                opening_hours: row.opening_hours,
                coordinates: Coordinates {
                    lat: row.lat,
                    lng: row.lng,
                },
                description: row.description,
                outlet_type: row.outlet_type,
                user_type: row.user_type,
                image: StoredImage {
                    url: row.image_url,
                    public_id: row.image_public_id,
                },
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    id: DocumentId,
    outlet_id: DocumentId,
    name: String,
    price: f64,
    delivery_time: String,
    description: String,
    rating: f64,
    image_url: String,
    image_public_id: String,
    created_at: DateTime<Utc>,
}

impl From<MenuItemRow> for Record<MenuItem> {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            body: MenuItem {
                outlet_id: row.outlet_id,
                name: row.name,
                price: row.price,
                delivery_time: row.delivery_time,
                description: row.description,
                rating: row.rating,
                image: StoredImage {
                    url: row.image_url,
                    public_id: row.image_public_id,
                },
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoomRow {
    id: DocumentId,
    price: f64,
    location: String,
    owner_name: String,
    furnishing: Furnishing,
    accommodation_type: AccommodationType,
    contact_number: String,
    room_description: String,
    facilities: Vec<String>,
    amenities: String,
    property_age: i32,
    available_from: DateTime<Utc>,
    images: Json<Vec<StoredImage>>,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Record<Room> {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            body: Room {
                price: row.price,
                location: row.location,
                owner_name: row.owner_name,
                furnishing: row.furnishing,
                accommodation_type: row.accommodation_type,
                contact_number: row.contact_number,
                room_description: row.room_description,
                facilities: row.facilities,
                amenities: row.amenities,
                property_age: row.property_age,
                available_from: row.available_from,
                images: row.images.0,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoommateRow {
    id: DocumentId,
    roommate_name: String,
    roommate_age: i32,
    roommate_gender: Gender,
    room_type: String,
    furnishing: String,
    facilities: Vec<String>,
    preferences: Vec<String>,
    room_desc: String,
    price: f64,
    vacancy: i32,
    address: String,
    profile_picture_url: String,
    profile_picture_public_id: String,
    created_at: DateTime<Utc>,
}

impl From<RoommateRow> for Record<Roommate> {
    fn from(row: RoommateRow) -> Self {
        Self {
            id: row.id,
            body: Roommate {
                roommate_name: row.roommate_name,
                roommate_age: row.roommate_age,
                roommate_gender: row.roommate_gender,
                room_type: row.room_type,
                furnishing: row.furnishing,
                facilities: row.facilities,
                preferences: row.preferences,
                room_desc: row.room_desc,
                price: row.price,
                vacancy: row.vacancy,
                address: row.address,
                profile_picture: StoredImage {
                    url: row.profile_picture_url,
                    public_id: row.profile_picture_public_id,
                },
            },
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// User Queries
// ============================================================================

/// Insert a user. A taken email fails with a unique violation on `users_email_key`.
pub async fn insert_user(pool: &PgPool, user: User) -> sqlx::Result<Record<User>> {
    let id = DocumentId::generate();
    let (picture_url, picture_id) = user
        .profile_picture
        .as_ref()
        .map(|p| (p.url.as_str(), p.public_id.as_str()))
        .unzip();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r"
        INSERT INTO users (id, name, email, password_hash, phone, user_type, address,
                           organization, dob, profile_picture_url, profile_picture_public_id,
                           is_google_sign_up)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING created_at
        ",
    )
    .bind(id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.password_hash.as_deref())
    .bind(&user.phone)
    .bind(user.user_type)
    .bind(user.address.as_deref())
    .bind(user.organization.as_deref())
    .bind(user.dob)
    .bind(picture_url)
    .bind(picture_id)
    .bind(user.is_google_sign_up)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_user", email = %user.email))?;

    Ok(Record {
        id,
        body: user,
        created_at,
    })
}

/// List users in creation order.
pub async fn list_users(pool: &PgPool) -> sqlx::Result<Vec<Record<User>>> {
    let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at, id")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_users"))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: DocumentId) -> sqlx::Result<Option<Record<User>>> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_id", user_id = %id))?;

    Ok(row.map(Into::into))
}

/// Find user by (normalized) email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<Record<User>>> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))?;

    Ok(row.map(Into::into))
}

// ============================================================================
// Outlet Queries
// ============================================================================

/// Insert an outlet.
pub async fn insert_outlet(pool: &PgPool, outlet: Outlet) -> sqlx::Result<Record<Outlet>> {
    let id = DocumentId::generate();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r"
        INSERT INTO outlets (id, outlet_name, location, phone, email, opening_hours, lat, lng,
                             description, outlet_type, user_type, image_url, image_public_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING created_at
        ",
    )
    .bind(id)
    .bind(&outlet.outlet_name)
    .bind(&outlet.location)
    .bind(&outlet.phone)
    .bind(&outlet.email)
    .bind(&outlet.opening_hours)
    .bind(outlet.coordinates.lat)
    .bind(outlet.coordinates.lng)
    .bind(&outlet.description)
    .bind(outlet.outlet_type)
    .bind(outlet.user_type)
    .bind(&outlet.image.url)
    .bind(&outlet.image.public_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_outlet", outlet_name = %outlet.outlet_name))?;

    Ok(Record {
        id,
        body: outlet,
        created_at,
    })
}

/// List outlets in creation order.
pub async fn list_outlets(pool: &PgPool) -> sqlx::Result<Vec<Record<Outlet>>> {
    let rows = sqlx::query_as::<_, OutletRow>("SELECT * FROM outlets ORDER BY created_at, id")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_outlets"))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find outlet by ID.
pub async fn find_outlet_by_id(
    pool: &PgPool,
    id: DocumentId,
) -> sqlx::Result<Option<Record<Outlet>>> {
    let row = sqlx::query_as::<_, OutletRow>("SELECT * FROM outlets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_outlet_by_id", outlet_id = %id))?;

    Ok(row.map(Into::into))
}

// ============================================================================
// Menu Queries
// ============================================================================

/// Insert a menu item. The outlet reference is not checked against `outlets`.
pub async fn insert_menu_item(pool: &PgPool, item: MenuItem) -> sqlx::Result<Record<MenuItem>> {
    let id = DocumentId::generate();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r"
        INSERT INTO menu_items (id, outlet_id, name, price, delivery_time, description, rating,
                                image_url, image_public_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING created_at
        ",
    )
    .bind(id)
    .bind(item.outlet_id)
    .bind(&item.name)
    .bind(item.price)
    .bind(&item.delivery_time)
    .bind(&item.description)
    .bind(item.rating)
    .bind(&item.image.url)
    .bind(&item.image.public_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_menu_item", outlet_id = %item.outlet_id))?;

    Ok(Record {
        id,
        body: item,
        created_at,
    })
}

/// List menu items in creation order.
pub async fn list_menu_items(pool: &PgPool) -> sqlx::Result<Vec<Record<MenuItem>>> {
    let rows =
        sqlx::query_as::<_, MenuItemRow>("SELECT * FROM menu_items ORDER BY created_at, id")
            .fetch_all(pool)
            .await
            .map_err(db_error!("list_menu_items"))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find menu item by ID.
pub async fn find_menu_item_by_id(
    pool: &PgPool,
    id: DocumentId,
) -> sqlx::Result<Option<Record<MenuItem>>> {
    let row = sqlx::query_as::<_, MenuItemRow>("SELECT * FROM menu_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_menu_item_by_id", menu_item_id = %id))?;

    Ok(row.map(Into::into))
}

// ============================================================================
// Room Queries
// ============================================================================

/// Insert a room with its already-uploaded images.
pub async fn insert_room(pool: &PgPool, room: Room) -> sqlx::Result<Record<Room>> {
    let id = DocumentId::generate();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r"
        INSERT INTO rooms (id, price, location, owner_name, furnishing, accommodation_type,
                           contact_number, room_description, facilities, amenities,
                           property_age, available_from, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING created_at
        ",
    )
    .bind(id)
    .bind(room.price)
    .bind(&room.location)
    .bind(&room.owner_name)
    .bind(room.furnishing)
    .bind(room.accommodation_type)
    .bind(&room.contact_number)
    .bind(&room.room_description)
    .bind(&room.facilities)
    .bind(&room.amenities)
    .bind(room.property_age)
    .bind(room.available_from)
    .bind(Json(&room.images))
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_room", image_count = room.images.len()))?;

    Ok(Record {
        id,
        body: room,
        created_at,
    })
}

/// List rooms in creation order.
pub async fn list_rooms(pool: &PgPool) -> sqlx::Result<Vec<Record<Room>>> {
    let rows = sqlx::query_as::<_, RoomRow>("SELECT * FROM rooms ORDER BY created_at, id")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_rooms"))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find room by ID.
pub async fn find_room_by_id(pool: &PgPool, id: DocumentId) -> sqlx::Result<Option<Record<Room>>> {
    let row = sqlx::query_as::<_, RoomRow>("SELECT * FROM rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_room_by_id", room_id = %id))?;

    Ok(row.map(Into::into))
}

// ============================================================================
// Roommate Queries
// ============================================================================

/// Insert a roommate listing.
pub async fn insert_roommate(pool: &PgPool, roommate: Roommate) -> sqlx::Result<Record<Roommate>> {
    let id = DocumentId::generate();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r"
        INSERT INTO roommates (id, roommate_name, roommate_age, roommate_gender, room_type,
                               furnishing, facilities, preferences, room_desc, price, vacancy,
                               address, profile_picture_url, profile_picture_public_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING created_at
        ",
    )
    .bind(id)
    .bind(&roommate.roommate_name)
    .bind(roommate.roommate_age)
    .bind(roommate.roommate_gender)
    .bind(&roommate.room_type)
    .bind(&roommate.furnishing)
    .bind(&roommate.facilities)
    .bind(&roommate.preferences)
    .bind(&roommate.room_desc)
    .bind(roommate.price)
    .bind(roommate.vacancy)
    .bind(&roommate.address)
    .bind(&roommate.profile_picture.url)
    .bind(&roommate.profile_picture.public_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_roommate", roommate_name = %roommate.roommate_name))?;

    Ok(Record {
        id,
        body: roommate,
        created_at,
    })
}

/// List roommates in creation order.
pub async fn list_roommates(pool: &PgPool) -> sqlx::Result<Vec<Record<Roommate>>> {
    let rows =
        sqlx::query_as::<_, RoommateRow>("SELECT * FROM roommates ORDER BY created_at, id")
            .fetch_all(pool)
            .await
            .map_err(db_error!("list_roommates"))?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find roommate by ID.
pub async fn find_roommate_by_id(
    pool: &PgPool,
    id: DocumentId,
) -> sqlx::Result<Option<Record<Roommate>>> {
    let row = sqlx::query_as::<_, RoommateRow>("SELECT * FROM roommates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_roommate_by_id", roommate_id = %id))?;

    Ok(row.map(Into::into))
}
