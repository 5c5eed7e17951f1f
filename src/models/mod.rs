use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Food offering of a mess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CuisineType {
    Veg,
    NonVeg,
    Both,
}

impl fmt::Display for CuisineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CuisineType::Veg => "Pure Veg",
            CuisineType::NonVeg => "Non-Veg",
            CuisineType::Both => "Veg & Non-Veg",
        };
        f.write_str(label)
    }
}

/// Price structure of a mess, in rupees. A field of 0 means the mess does
/// not offer that plan; price filters treat a missing monthly plan as
/// infinitely expensive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Price {
    pub one_time: u32,
    pub two_time: u32,
    pub monthly: u32,
}

/// A single rating/comment left on a mess. Reviews are append-only; the
/// server keeps them newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Star rating, 1 to 5
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Core mess listing data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mess {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub price: Price,
    pub reviews: Vec<Review>,
    pub google_maps_link: String,
    pub owner_id: String,
    pub cuisine_type: CuisineType,
}

impl Mess {
    /// Monthly plan price, if the mess offers one. Legacy records store 0
    /// for "no plan".
    pub fn monthly_price(&self) -> Option<u32> {
        (self.price.monthly > 0).then_some(self.price.monthly)
    }
}

/// Role fixed at account creation. The server's older schema called the
/// privileged role ADMIN; both spellings land on `Owner`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Student,
    #[serde(alias = "ADMIN")]
    Owner,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Student => f.write_str("STUDENT"),
            UserRole::Owner => f.write_str("OWNER"),
        }
    }
}

/// Projection of the authenticated user as the backend reports it.
/// Accounts created through Google may have no usable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
}

impl User {
    /// Name to show in the UI and to sign reviews with: name, then email,
    /// then "Anonymous".
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Anonymous")
    }

    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }
}
