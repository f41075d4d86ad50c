//! Stateless extractors that compute one signal from a fetched listing page.
//!
//! Every extractor takes `Option<&ParsedPage>`; a missing page means the
//! fetch failed and the result is always the `"Error"` sentinel.

use crate::models::{Signal, ERROR, FOUND, NOT_FOUND, NOT_FOUND_LOWER, NO_IMAGES_FOUND};
use crate::scrapers::fetcher::ParsedPage;
use scraper::{ElementRef, Selector};

const HERO_MIN_WIDTH: u64 = 600;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn error() -> Signal {
    Signal::text(ERROR)
}

/// Text of an element with each text node trimmed and glued together
fn stripped_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// First `span` or `div`, in document order, whose text mentions "rating"
/// and carries at least one digit.
pub fn find_rating(page: Option<&ParsedPage>) -> Signal {
    let Some(page) = page else {
        return error();
    };

    let candidates = selector("span, div");
    let rating = page
        .document()
        .root_element()
        .select(&candidates)
        .map(|element| stripped_text(&element))
        .find(|text| {
            text.to_lowercase().contains("rating") && text.chars().any(|c| c.is_ascii_digit())
        });

    rating
        .map(Signal::Text)
        .unwrap_or_else(|| Signal::text(NOT_FOUND_LOWER))
}

pub fn count_images(page: Option<&ParsedPage>) -> Signal {
    let Some(page) = page else {
        return error();
    };

    Signal::Count(page.document().root_element().select(&selector("img")).count())
}

fn is_wide(width: &str) -> bool {
    if width.is_empty() || !width.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    // All digits but too long for u64 is still wide enough
    width.parse::<u64>().map_or(true, |w| w >= HERO_MIN_WIDTH)
}

/// `src` of the first image at least 600 wide, falling back to the first
/// image on the page.
pub fn find_hero_photo(page: Option<&ParsedPage>) -> Signal {
    let Some(page) = page else {
        return error();
    };

    let img = selector("img");
    let images: Vec<_> = page.document().root_element().select(&img).collect();
    let Some(first) = images.first() else {
        return Signal::text(NO_IMAGES_FOUND);
    };

    let hero = images.iter().find_map(|image| {
        let element = image.value();
        let src = element.attr("src").filter(|src| !src.is_empty())?;
        element.attr("width").filter(|w| is_wide(w)).map(|_| src)
    });

    match hero {
        Some(src) => Signal::text(src),
        None => first
            .value()
            .attr("src")
            .filter(|src| !src.is_empty())
            .map(Signal::text)
            .unwrap_or_else(|| Signal::text(NOT_FOUND_LOWER)),
    }
}

/// Trimmed text of the first `h1`
pub fn first_heading(page: Option<&ParsedPage>) -> Signal {
    let Some(page) = page else {
        return error();
    };

    page.document()
        .root_element()
        .select(&selector("h1"))
        .next()
        .map(|h1| Signal::text(h1.text().collect::<String>().trim()))
        .unwrap_or_else(|| Signal::text(NOT_FOUND))
}

/// All text nodes of the page joined by a space, lowercased
pub fn page_text(page: &ParsedPage) -> String {
    page.document()
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// "Found" if any keyword occurs anywhere in the page text, case-insensitively
pub fn contains_any<S: AsRef<str>>(page: Option<&ParsedPage>, keywords: &[S]) -> Signal {
    let Some(page) = page else {
        return error();
    };

    let text = page_text(page);
    let hit = keywords
        .iter()
        .any(|keyword| text.contains(&keyword.as_ref().to_lowercase()));

    Signal::text(if hit { FOUND } else { NOT_FOUND })
}
