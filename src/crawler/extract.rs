//! Card field capture and record assembly.
//!
//! Capture is split in two: `collect_raw_card` does the effectful DOM reads
//! and nothing else, `assemble_listing` turns the raw text into a record
//! purely, so the entire assembly grammar is testable without a browser.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use chromiumoxide::Element;
use chrono::{DateTime, Local};
use regex::Regex;

use crate::locate::{text_first, Scope};
use crate::parse;
use crate::selectors::{field, SelectorTable};

use super::types::{Listing, PropertyType};

static DETAIL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"detail_id=([^&]+)").unwrap());
static ROOM_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/room/([0-9A-Za-z]+)").unwrap());

/// Raw per-field text pulled off one card, before any normalization.
#[derive(Debug, Clone, Default)]
pub struct RawCard {
    pub price_text: Option<String>,
    pub address_text: Option<String>,
    pub realtor_text: Option<String>,
    pub maintenance_text: Option<String>,
    pub time_text: Option<String>,
    pub href: Option<String>,
    /// Whole-card inner text; the fallback source for every field above.
    pub full_text: String,
}

/// Reads every field of one card element. DOM failures degrade to missing
/// fields; assembly decides whether the card is still usable.
pub async fn collect_raw_card(card: &Element, table: &SelectorTable) -> RawCard {
    let scope = Scope::Element(card);

    let href = {
        let mut found = None;
        for selector in table.candidates(field::CARD_LINK) {
            for el in scope.query_all(selector).await {
                if let Ok(Some(href)) = el.attribute("href").await {
                    if !href.is_empty() {
                        found = Some(href);
                        break;
                    }
                }
            }
            if found.is_some() {
                break;
            }
        }
        // the card itself may be the anchor
        if found.is_none() {
            if let Ok(Some(href)) = card.attribute("href").await {
                if !href.is_empty() {
                    found = Some(href);
                }
            }
        }
        found
    };

    RawCard {
        price_text: text_first(&scope, table, field::CARD_PRICE).await,
        address_text: match text_first(&scope, table, field::CARD_ADDRESS).await {
            Some(text) => Some(text),
            None => text_first(&scope, table, field::CARD_ADDRESS_HINT).await,
        },
        realtor_text: text_first(&scope, table, field::CARD_REALTOR).await,
        maintenance_text: text_first(&scope, table, field::CARD_MAINTENANCE).await,
        time_text: text_first(&scope, table, field::CARD_TIME).await,
        href,
        full_text: match card.inner_text().await {
            Ok(Some(text)) => text,
            _ => String::new(),
        },
    }
}

/// Builds a record from raw card text. Returns `None` when no address
/// pattern can be found anywhere on the card; address-less rows are
/// worthless downstream and are dropped at the source.
pub fn assemble_listing(
    raw: &RawCard,
    property_type: PropertyType,
    base_url: &str,
    now: DateTime<Local>,
) -> Option<Listing> {
    let address_source = raw.address_text.as_deref().unwrap_or(&raw.full_text);
    let address = parse::extract_lot_address(address_source)
        .or_else(|| parse::extract_lot_address(&raw.full_text))?;

    let price_text = raw
        .price_text
        .clone()
        .map(|t| parse::normalize_whitespace(&t))
        .or_else(|| parse::extract_price_text(&raw.full_text))
        .unwrap_or_default();
    let price_won = parse::parse_price_to_won(if price_text.is_empty() {
        &raw.full_text
    } else {
        &price_text
    });

    // whole-card text is only trusted for the fee when it actually carries
    // the 관리비 token, and only the text after it; the first number on a
    // card is usually the deposit
    let maintenance_fee_won = raw
        .maintenance_text
        .as_deref()
        .and_then(parse::parse_maintenance_fee_won)
        .or_else(|| {
            raw.full_text
                .find("관리비")
                .and_then(|idx| parse::parse_maintenance_fee_won(&raw.full_text[idx..]))
        });

    let realtor = raw
        .realtor_text
        .as_deref()
        .and_then(parse::extract_realtor)
        .or_else(|| raw.realtor_text.clone().map(|t| parse::normalize_whitespace(&t)))
        .or_else(|| parse::extract_realtor(&raw.full_text))
        .unwrap_or_default();

    let posted_at = parse::to_ymd_at(
        raw.time_text.as_deref().unwrap_or(&raw.full_text),
        now,
    );

    let url = raw
        .href
        .as_deref()
        .map(|h| absolute_url(base_url, h))
        .unwrap_or_default();
    let item_id = item_id_from_url(&url)
        .unwrap_or_else(|| content_hash(&address, price_won));

    Some(Listing {
        address,
        price_text,
        price_won,
        maintenance_fee_won,
        realtor,
        posted_at,
        property_type: property_type.label().to_string(),
        url,
        item_id,
        area_m2: parse::extract_area_m2(&raw.full_text),
        floor: parse::extract_floor(&raw.full_text),
    })
}

/// Stable id out of a detail URL: `detail_id` query param first, then the
/// `/room/{id}` path segment.
pub fn item_id_from_url(url: &str) -> Option<String> {
    if let Some(caps) = DETAIL_ID_RE.captures(url) {
        return Some(caps[1].to_string());
    }
    ROOM_PATH_RE.captures(url).map(|c| c[1].to_string())
}

/// Fallback identity for cards without a usable link.
pub fn content_hash(address: &str, price_won: i64) -> String {
    let mut hasher = DefaultHasher::new();
    address.hash(&mut hasher);
    price_won.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}
