use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{CuisineType, Mess, Price, Review, User, UserRole};

/// Mess record as the backend returns it. Field names follow the server's
/// JSON; several fields are optional on legacy documents and get defaulted
/// during normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub reviews: Vec<ReviewDoc>,
    #[serde(default)]
    pub google_maps_link: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub cuisine_type: Option<CuisineType>,
}

impl MessDoc {
    /// Normalize a server document into the client's `Mess` shape:
    /// `_id` becomes `id`, missing city/state become empty strings, a
    /// missing cuisine defaults to `Veg` and review dates are parsed.
    pub fn normalize(self) -> Mess {
        Mess {
            id: self.id,
            name: self.name,
            address: self.address,
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            contact: self.contact,
            price: self.price.unwrap_or_default(),
            reviews: self.reviews.into_iter().map(ReviewDoc::normalize).collect(),
            google_maps_link: self.google_maps_link,
            owner_id: self.owner_id,
            cuisine_type: self.cuisine_type.unwrap_or(CuisineType::Veg),
        }
    }
}

/// Review as embedded in a server mess document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDoc {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl ReviewDoc {
    /// A date the server sends that is missing or unparseable falls back
    /// to the Unix epoch rather than failing the whole fetch.
    fn normalize(self) -> Review {
        let date = self
            .date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let author = if self.author.trim().is_empty() {
            "Anonymous".to_string()
        } else {
            self.author
        };
        Review {
            id: self.id,
            author,
            author_id: self.author_id,
            rating: self.rating,
            comment: self.comment,
            date,
        }
    }
}

/// User document returned by the auth endpoints. Login and register also
/// carry the bearer token; `/auth/me` does not.
#[derive(Debug, Deserialize)]
pub struct AuthDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthDoc {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Payload for creating a mess listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMess {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
    pub state: String,
    pub price: Price,
    pub google_maps_link: String,
    pub cuisine_type: CuisineType,
}

impl NewMess {
    /// Mirrors the server's required-field check so bad input never makes
    /// it onto the wire.
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("googleMapsLink", &self.google_maps_link),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::validation(format!("{field} is required")));
            }
        }
        if self.contact.len() != 10 || !self.contact.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::validation(
                "contact number must be exactly 10 digits",
            ));
        }
        Ok(())
    }
}

/// Payload for submitting a review. `author` is the submitter's display
/// name, "Anonymous" when nobody is logged in.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
    pub author: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::validation("rating must be between 1 and 5"));
        }
        if self.comment.trim().is_empty() {
            return Err(ApiError::validation("comment must not be empty"));
        }
        Ok(())
    }
}

/// Payload for creating an account.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}
