//! Column dispatcher: picks the extractor for a spreadsheet column.
//!
//! Exact column names select the structural extractors. Anything else is
//! matched against the category table in priority order (lowercased
//! substring match), and unknown columns search the page for their own name.

use crate::models::{CellValue, Signal, INVALID_URL};
use crate::scrapers::fetcher::{fetch, ParsedPage};
use crate::scrapers::signals;
use crate::scrapers::traits::PageSource;

/// Semantic grouping of spreadsheet columns that share a synonym list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CheckIn,
    CheckOut,
    Pool,
    Restaurant,
    Renovation,
    Amenity,
    GuestMessaging,
    RoomType,
    ContentScore,
    OtherDetails,
}

/// Priority-ordered `(category, column pattern, keywords)` table
pub const CATEGORY_TABLE: &[(Category, &str, &[&str])] = &[
    (Category::CheckIn, "Check-In", &["check-in", "arrival"]),
    (Category::CheckOut, "Check-Out", &["check-out", "departure"]),
    (Category::Pool, "Pool", &["pool", "swimming", "jacuzzi", "spa"]),
    (
        Category::Restaurant,
        "Restaurant",
        &["restaurant", "dining", "meals", "breakfast"],
    ),
    (
        Category::Renovation,
        "Renovation",
        &["renovation", "updated", "remodel", "construction"],
    ),
    (
        Category::Amenity,
        "Amenity",
        &["fees", "charges", "amenity", "resort fee", "tax"],
    ),
    (
        Category::GuestMessaging,
        "Guest Messaging",
        &["message", "guest", "contact", "chat", "communication"],
    ),
    (
        Category::RoomType,
        "Room Type",
        &["room", "suite", "bed", "accommodation"],
    ),
    (
        Category::ContentScore,
        "Content Score",
        &["score", "quality", "details"],
    ),
    (
        Category::OtherDetails,
        "Other Details",
        &["details", "info", "description"],
    ),
];

impl Category {
    /// First category whose pattern occurs in the column name
    pub fn for_column(column: &str) -> Option<Self> {
        let column = column.to_lowercase();
        CATEGORY_TABLE
            .iter()
            .find(|(_, pattern, _)| column.contains(&pattern.to_lowercase()))
            .map(|(category, _, _)| *category)
    }

    pub fn keywords(self) -> &'static [&'static str] {
        CATEGORY_TABLE
            .iter()
            .find(|(category, _, _)| *category == self)
            .map(|(_, _, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

/// Strategy used to compute a column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Rating,
    ImageCount,
    HeroPhoto,
    PagePlacement,
    Keywords(Category),
    /// Search the page for the column name itself
    ColumnName,
}

impl Extractor {
    pub fn for_column(column: &str) -> Self {
        match column {
            "Current Rating" => Extractor::Rating,
            "No. of Images" => Extractor::ImageCount,
            "Hero Photo?" => Extractor::HeroPhoto,
            "Page Placement" => Extractor::PagePlacement,
            _ => Category::for_column(column)
                .map(Extractor::Keywords)
                .unwrap_or(Extractor::ColumnName),
        }
    }

    pub fn apply(self, column: &str, page: Option<&ParsedPage>) -> Signal {
        match self {
            Extractor::Rating => signals::find_rating(page),
            Extractor::ImageCount => signals::count_images(page),
            Extractor::HeroPhoto => signals::find_hero_photo(page),
            Extractor::PagePlacement => signals::first_heading(page),
            Extractor::Keywords(category) => signals::contains_any(page, category.keywords()),
            Extractor::ColumnName => signals::contains_any(page, &[column]),
        }
    }
}

/// The URL to fetch for a cell, if the cell holds one
pub fn fetchable_url(cell: &CellValue) -> Option<&str> {
    cell.as_text().filter(|text| text.starts_with("http"))
}

/// Compute one result cell, fetching the page it points at.
/// Cells that are not URLs short-circuit to "Invalid URL" with no fetch.
pub async fn process_column<S: PageSource + ?Sized>(
    source: &S,
    column: &str,
    cell: &CellValue,
) -> Signal {
    let Some(url) = fetchable_url(cell) else {
        return Signal::text(INVALID_URL);
    };

    let page = fetch(source, url).await;
    Extractor::for_column(column).apply(column, page.as_ref())
}
