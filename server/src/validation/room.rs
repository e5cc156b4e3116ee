use chrono::{DateTime, Utc};

use super::{Checker, ValidationErrors};
use crate::db::{AccommodationType, Furnishing, Room, StoredImage};
use crate::forms::MultipartForm;

/// Upper bound on photos attached to one room listing.
pub const MAX_ROOM_IMAGES: usize = 4;

/// Validated room fields; the photos are still in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInput {
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
}

impl RoomInput {
    #[must_use]
    pub fn into_room(self, images: Vec<StoredImage>) -> Room {
        Room {
            price: self.price,
            location: self.location,
            owner_name: self.owner_name,
            furnishing: self.furnishing,
            accommodation_type: self.accommodation_type,
            contact_number: self.contact_number,
            room_description: self.room_description,
            facilities: self.facilities,
            amenities: self.amenities,
            property_age: self.property_age,
            available_from: self.available_from,
            images,
        }
    }
}

/// Validate a room listing. `availableFrom` must be strictly after `now`.
pub fn validate_room(
    form: &MultipartForm,
    now: DateTime<Utc>,
) -> Result<RoomInput, ValidationErrors> {
    let mut c = Checker::new(&form.fields);

    let price = c
        .number("price", "Price")
        .filter(|p| c.ensure(*p > 0.0, "price", "Price must be a positive number."));
    let location = c.text("location", "Location", 3, 100);
    let owner_name = c.text("ownerName", "Owner name", 2, 50);
    let furnishing: Option<Furnishing> =
        c.choice("furnishing", "Furnishing type", "Furnishing type is not valid.");
    let accommodation_type: Option<AccommodationType> = c.choice(
        "accommodationType",
        "Accommodation type",
        "Accommodation type is not valid.",
    );
    let contact_number = c.phone("contactNumber", "Contact number");
    let room_description = c.text("roomDescription", "Room description", 10, 500);
    let facilities = form.fields.list("facilities");
    let amenities = c.text("amenities", "Amenities", 3, 200);
    let property_age = c.integer("propertyAge", "Property age", 0, i32::MAX);
    let available_from = c.timestamp("availableFrom", "Available from").filter(|ts| {
        c.ensure(
            *ts > now,
            "availableFrom",
            "Available from must be a future date.",
        )
    });

    let image_count = form.files_named("images").count();
    if image_count == 0 {
        c.fail("images", "At least one image is required.");
    } else if image_count > MAX_ROOM_IMAGES {
        c.fail(
            "images",
            format!("You can upload a maximum of {MAX_ROOM_IMAGES} images."),
        );
    }

    c.finish(|| {
        Some(RoomInput {
            price: price?,
            location: location?,
            owner_name: owner_name?,
            furnishing: furnishing?,
            accommodation_type: accommodation_type?,
            contact_number: contact_number?,
            room_description: room_description?,
            facilities,
            amenities: amenities?,
            property_age: property_age?,
            available_from: available_from?,
        })
    })
}
