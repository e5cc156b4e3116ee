//! Database Models
//!
//! Entity bodies are plain structs; a stored entity is wrapped in [`Record`],
//! which adds the generated identifier and creation timestamp.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a stored record.
///
/// Only obtainable from [`DocumentId::generate`] or a successful
/// [`DocumentId::parse`], so lookups never reach storage with a malformed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DocumentId(Uuid);

/// A lookup key that is not a syntactically valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier: {0}")]
pub struct InvalidIdentifier(pub String);

impl DocumentId {
    /// Generate a fresh, time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse a client-supplied identifier.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidIdentifier(raw.to_string()))
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored entity: generated id, the entity body, creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub body: T,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Enumerations
// ============================================================================

/// A string that is not one of an enumeration's accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Declares a closed set of display strings stored as a `PostgreSQL` enum type.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $pg:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = $pg)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                #[sqlx(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire and storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant(s.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Account role chosen at registration.
    pub enum UserType as "user_type" {
        User => "User",
        MultiMessManager => "Multi-Mess Manager",
        ResidencyOwner => "Residency Owner",
    }
}

text_enum! {
    /// Roles allowed to own an outlet.
    pub enum OutletOwner as "outlet_owner" {
        MultiMessManager => "Multi-Mess Manager",
        ResidencyOwner => "Residency Owner",
    }
}

text_enum! {
    /// Kind of outlet, always derived from its owner's role.
    pub enum OutletType as "outlet_type" {
        Mess => "Mess",
        Residence => "Residence",
    }
}

impl OutletType {
    /// Mess managers run messes; every other owner lists a residence.
    #[must_use]
    pub const fn for_owner(owner: OutletOwner) -> Self {
        match owner {
            OutletOwner::MultiMessManager => Self::Mess,
            OutletOwner::ResidencyOwner => Self::Residence,
        }
    }
}

text_enum! {
    /// Furnishing level of a listed room.
    pub enum Furnishing as "furnishing" {
        FullyFurnished => "Fully Furnished",
        PartiallyFurnished => "Partially Furnished",
        SemiFurnished => "Semi Furnished",
        Unfurnished => "Unfurnished",
        FurnishingIncluded => "Furnishing Included",
        FurnishingNegotiable => "Furnishing Negotiable",
        MinimalistFurnished => "Minimalist Furnished",
        LuxuryFurnished => "Luxury Furnished",
        VintageFurnished => "Vintage Furnished",
        ModernFurnished => "Modern Furnished",
        StudentAccommodation => "Student Accommodation",
        FamilyFriendlyFurnished => "Family-Friendly Furnished",
        CozyFurnished => "Cozy Furnished",
        TemporaryFurnished => "Temporary Furnished",
        OfficeFurnished => "Office Furnished",
    }
}

text_enum! {
    /// Layout of a listed room.
    pub enum AccommodationType as "accommodation_type" {
        Studio => "Studio",
        OneBhk => "1BHK",
        TwoBhk => "2BHK",
        ThreeBhk => "3BHK",
        FourBhk => "4BHK",
        FiveBhk => "5BHK",
        Duplex => "Duplex",
        Penthouse => "Penthouse",
        Villa => "Villa",
        SharedRoom => "Shared Room",
        PrivateRoom => "Private Room",
        Townhouse => "Townhouse",
    }
}

text_enum! {
    pub enum Gender as "gender" {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

// ============================================================================
// Embedded values
// ============================================================================

/// An uploaded image as returned by object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    /// Public URL of the object.
    pub url: String,
    /// Storage-side identifier of the object.
    pub public_id: String,
}

/// Geographic position of an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

// ============================================================================
// Entities
// ============================================================================

/// Registered account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; absent for federated sign-ups.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: String,
    pub user_type: UserType,
    pub address: Option<String>,
    pub organization: Option<String>,
    pub dob: Option<NaiveDate>,
    pub profile_picture: Option<StoredImage>,
    pub is_google_sign_up: bool,
}

/// Mess or residence provider location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub outlet_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub outlet_type: OutletType,
    pub user_type: OutletOwner,
    pub image: StoredImage,
}

/// Public projection of an outlet returned by the by-id lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletSummary {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub outlet_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: String,
    pub coordinates: Coordinates,
    pub image: StoredImage,
}

impl From<Record<Outlet>> for OutletSummary {
    fn from(record: Record<Outlet>) -> Self {
        let outlet = record.body;
        Self {
            id: record.id,
            outlet_name: outlet.outlet_name,
            location: outlet.location,
            phone: outlet.phone,
            email: outlet.email,
            opening_hours: outlet.opening_hours,
            coordinates: outlet.coordinates,
            image: outlet.image,
        }
    }
}

/// Dish offered by a mess outlet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub outlet_id: DocumentId,
    pub name: String,
    pub price: f64,
    pub delivery_time: String,
    pub description: String,
    pub rating: f64,
    pub image: StoredImage,
}

/// Room listed for rent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub price: f64,
    pub location: String,
    pub owner_name: String,
    pub furnishing: Furnishing,
    pub accommodation_type: AccommodationType,
    pub contact_number: String,
    pub room_description: String,
    pub facilities: Vec<String>,
    pub amenities: String,
    pub property_age: i32,
    pub available_from: DateTime<Utc>,
    pub images: Vec<StoredImage>,
}

/// Person looking to share a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roommate {
    pub roommate_name: String,
    pub roommate_age: i32,
    pub roommate_gender: Gender,
    pub room_type: String,
    pub furnishing: String,
    pub facilities: Vec<String>,
    pub preferences: Vec<String>,
    pub room_desc: String,
    pub price: f64,
    pub vacancy: i32,
    pub address: String,
    pub profile_picture: StoredImage,
}
