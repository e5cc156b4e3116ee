use validator::ValidateRange;

use super::{Checker, ValidationErrors};
use crate::db::{DocumentId, MenuItem, StoredImage};
use crate::forms::MultipartForm;

/// Validated menu item fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemInput {
    pub outlet_id: DocumentId,
    pub name: String,
    pub price: f64,
    pub delivery_time: String,
    pub description: String,
    pub rating: f64,
}

impl MenuItemInput {
    #[must_use]
    pub fn into_menu_item(self, image: StoredImage) -> MenuItem {
        MenuItem {
            outlet_id: self.outlet_id,
            name: self.name,
            price: self.price,
            delivery_time: self.delivery_time,
            description: self.description,
            rating: self.rating,
            image,
        }
    }
}

pub fn validate_menu_item(form: &MultipartForm) -> Result<MenuItemInput, ValidationErrors> {
    let mut c = Checker::new(&form.fields);

    let outlet_id = c.required("outletId", "Outlet id").and_then(|raw| {
        let parsed = DocumentId::parse(raw).ok();
        if parsed.is_none() {
            c.fail("outletId", "Outlet id must be a valid identifier.");
        }
        parsed
    });
    let name = c.text("name", "Name", 3, 100);
    let price = c.number("price", "Price").filter(|p| {
        c.ensure(
            p.validate_range(None, None, Some(0.0), None),
            "price",
            "Price must be a positive number.",
        )
    });
    let delivery_time = c.text("deliveryTime", "Delivery time", 3, 100);
    let description = c.text("description", "Description", 10, 500);
    let rating = c.number("rating", "Rating").filter(|r| {
        c.ensure(
            r.validate_range(Some(1.0), Some(5.0), None, None),
            "rating",
            "Rating must be between 1 and 5.",
        )
    });

    c.ensure(form.file("image").is_some(), "image", "Image is required.");

    c.finish(|| {
        Some(MenuItemInput {
            outlet_id: outlet_id?,
            name: name?,
            price: price?,
            delivery_time: delivery_time?,
            description: description?,
            rating: rating?,
        })
    })
}
