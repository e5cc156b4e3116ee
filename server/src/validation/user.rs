use chrono::{DateTime, Utc};

use super::{Checker, ValidationErrors};
use crate::db::{StoredImage, User, UserType};
use crate::forms::MultipartForm;

/// Validated registration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    /// Plain-text password; `None` for federated sign-ups.
    pub password: Option<String>,
    pub phone: String,
    pub user_type: UserType,
    pub address: Option<String>,
    pub organization: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    pub is_google_sign_up: bool,
    /// Identity-provider picture to import, for federated sign-ups.
    pub remote_picture: Option<String>,
}

impl UserInput {
    #[must_use]
    pub fn into_user(self, password_hash: Option<String>, picture: Option<StoredImage>) -> User {
        User {
            name: self.name,
            email: self.email,
            password_hash,
            phone: self.phone,
            user_type: self.user_type,
            address: self.address,
            organization: self.organization,
            dob: self.dob,
            profile_picture: picture,
            is_google_sign_up: self.is_google_sign_up,
        }
    }
}

/// Validate a registration form.
///
/// Local accounts need a password and may attach a picture file; federated
/// accounts carry no password and must supply the provider's picture URL.
pub fn validate_user(form: &MultipartForm, now: DateTime<Utc>) -> Result<UserInput, ValidationErrors> {
    let mut c = Checker::new(&form.fields);

    let is_google_sign_up = c.flag("isGoogleSignUp", "isGoogleSignUp");
    let name = c.text("name", "Name", 2, 50);
    let email = c.email("email", "Email");
    let password = if is_google_sign_up {
        None
    } else {
        c.text("password", "Password", 8, 128)
    };
    let phone = c.phone("phone", "Phone number");
    let user_type: Option<UserType> = c.choice(
        "userType",
        "User type",
        "User type must be one of User, Multi-Mess Manager or Residency Owner.",
    );
    let address = c.optional_text("address", "Address", 200);
    let organization = c.optional_text("organization", "Organization", 200);
    let dob = c.optional_date("dob", "Date of birth").filter(|d| {
        c.ensure(
            *d <= now.date_naive(),
            "dob",
            "Date of birth cannot be in the future.",
        )
    });
    let remote_picture = if is_google_sign_up {
        c.public_http_url("profilePicture", "Profile picture")
    } else {
        None
    };

    c.finish(|| {
        Some(UserInput {
            name: name?,
            email: email?,
            password: if is_google_sign_up { None } else { Some(password?) },
            phone: phone?,
            user_type: user_type?,
            address,
            organization,
            dob,
            is_google_sign_up,
            remote_picture: if is_google_sign_up {
                Some(remote_picture?)
            } else {
                None
            },
        })
    })
}
