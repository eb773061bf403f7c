use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CategoryId, UserId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct BookId(pub uuid::Uuid);

impl BookId {
    pub fn new() -> Self {
        BookId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(BookId)
    }
}

pub const BOOK_TITLE_MAX_LEN: usize = 200;
pub const MIN_RELEASE_YEAR: i32 = 1980;
pub const MAX_RELEASE_YEAR: i32 = 2024;
/// Books with more pages than this are `Thick`.
pub const THICK_PAGE_THRESHOLD: i32 = 100;

/// Stored and served as `tebal` / `tipis`, the values existing clients and
/// rows already use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Thickness {
    #[serde(rename = "tebal")]
    Thick,
    #[serde(rename = "tipis")]
    Thin,
}

impl Thickness {
    pub fn for_pages(total_page: i32) -> Self {
        if total_page > THICK_PAGE_THRESHOLD {
            Thickness::Thick
        } else {
            Thickness::Thin
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Thickness::Thick => "tebal",
            Thickness::Thin => "tipis",
        }
    }
}

impl std::str::FromStr for Thickness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tebal" => Ok(Thickness::Thick),
            "tipis" => Ok(Thickness::Thin),
            other => Err(format!("unknown thickness: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub category_id: CategoryId,
    pub description: String,
    pub image_url: String,
    pub release_year: i32,
    pub price: f64,
    pub total_page: i32,
    pub thickness: Thickness,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<UserId>,
}
