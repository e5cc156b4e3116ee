use validator::ValidateRange;

use super::{Checker, ValidationErrors};
use crate::db::{Coordinates, Outlet, OutletOwner, OutletType, StoredImage};
use crate::forms::MultipartForm;

/// Validated outlet fields, awaiting the uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct OutletInput {
    pub outlet_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub user_type: OutletOwner,
}

impl OutletInput {
    /// Build the stored document. The outlet type is always derived from the
    /// owner role, whatever the client submitted.
    #[must_use]
    pub fn into_outlet(self, image: StoredImage) -> Outlet {
        Outlet {
            outlet_name: self.outlet_name,
            location: self.location,
            phone: self.phone,
            email: self.email,
            opening_hours: self.opening_hours,
            coordinates: self.coordinates,
            description: self.description,
            outlet_type: OutletType::for_owner(self.user_type),
            user_type: self.user_type,
            image,
        }
    }
}

/// Validate an outlet submission (shared by the mess and residence routes).
pub fn validate_outlet(form: &MultipartForm) -> Result<OutletInput, ValidationErrors> {
    let mut c = Checker::new(&form.fields);

    let outlet_name = c.text("outletName", "Outlet name", 3, 50);
    let location = c.required("location", "Location").map(String::from);
    let phone = c.phone("phone", "Phone number");
    let email = c.email("email", "Email");
    let opening_hours = c.text("openingHours", "Opening hours", 5, 100);
    let description = c.required("description", "Description").map(String::from);

    let lat = c.number("coordinates.lat", "Latitude");
    if let Some(lat) = lat {
        c.ensure(
            lat.validate_range(Some(-90.0), Some(90.0), None, None),
            "coordinates.lat",
            "Latitude must be between -90 and 90.",
        );
    }
    let lng = c.number("coordinates.lng", "Longitude");
    if let Some(lng) = lng {
        c.ensure(
            lng.validate_range(Some(-180.0), Some(180.0), None, None),
            "coordinates.lng",
            "Longitude must be between -180 and 180.",
        );
    }

    let user_type: Option<OutletOwner> = c.choice(
        "userType",
        "User type",
        "User type must be either Multi-Mess Manager or Residency Owner.",
    );
    let outlet_type: Option<OutletType> = c.choice(
        "outletType",
        "Outlet type",
        "Outlet type must be Mess or Residence.",
    );
    if let (Some(owner), Some(kind)) = (user_type, outlet_type) {
        c.ensure(
            OutletType::for_owner(owner) == kind,
            "outletType",
            "Outlet type must be Mess for Multi-Mess Manager and Residence for Residency Owner.",
        );
    }

    c.ensure(form.file("image").is_some(), "image", "Image is required.");

    c.finish(|| {
        Some(OutletInput {
            outlet_name: outlet_name?,
            location: location?,
            phone: phone?,
            email: email?,
            opening_hours: opening_hours?,
            coordinates: Coordinates {
                lat: lat?,
                lng: lng?,
            },
            description: description?,
            user_type: user_type?,
        })
    })
}
