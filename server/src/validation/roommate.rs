use super::{Checker, ValidationErrors};
use crate::db::{Gender, Roommate, StoredImage};
use crate::forms::MultipartForm;

/// Validated roommate fields, awaiting the profile picture.
#[derive(Debug, Clone, PartialEq)]
pub struct RoommateInput {
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
}

impl RoommateInput {
    #[must_use]
    pub fn into_roommate(self, profile_picture: StoredImage) -> Roommate {
        Roommate {
            roommate_name: self.roommate_name,
            roommate_age: self.roommate_age,
            roommate_gender: self.roommate_gender,
            room_type: self.room_type,
            furnishing: self.furnishing,
            facilities: self.facilities,
            preferences: self.preferences,
            room_desc: self.room_desc,
            price: self.price,
            vacancy: self.vacancy,
            address: self.address,
            profile_picture,
        }
    }
}

pub fn validate_roommate(form: &MultipartForm) -> Result<RoommateInput, ValidationErrors> {
    let mut c = Checker::new(&form.fields);

    let roommate_name = c.text("roommateName", "Roommate name", 2, 50);
    let roommate_age = c.integer("roommateAge", "Roommate age", 18, 100);
    let roommate_gender: Option<Gender> = c.choice(
        "roommateGender",
        "Roommate gender",
        "Roommate gender must be one of Male, Female or Other.",
    );
    let room_type = c.required("roomType", "Room type").map(String::from);
    let furnishing = c.required("furnishing", "Furnishing").map(String::from);
    let facilities = c.non_empty_list("facilities", "Facilities");
    let preferences = c.non_empty_list("preferences", "Preferences");
    let room_desc = c.text("roomDesc", "Room description", 10, 500);
    let price = c
        .number("price", "Price")
        .filter(|p| c.ensure(*p >= 0.0, "price", "Price must be 0 or greater."));
    let vacancy = c.integer("vacancy", "Vacancy", 1, 20);
    let address = c.text("address", "Address", 5, 100);

    c.ensure(
        form.file("profilePicture").is_some(),
        "profilePicture",
        "Profile picture is required.",
    );

    c.finish(|| {
        Some(RoommateInput {
            roommate_name: roommate_name?,
            roommate_age: roommate_age?,
            roommate_gender: roommate_gender?,
            room_type: room_type?,
            furnishing: furnishing?,
            facilities: facilities?,
            preferences: preferences?,
            room_desc: room_desc?,
            price: price?,
            vacancy: vacancy?,
            address: address?,
        })
    })
}
