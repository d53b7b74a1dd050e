//! Ordered candidate selector table for the Dabang map UI.
//!
//! The site is a styled-components SPA whose class names drift between
//! deploys, so every logical field maps to a priority-ordered list of CSS
//! candidates: newer, more specific selectors first, older fallbacks last.
//! Resolution always starts at index 0 and returns on the first candidate
//! with at least one match, so appending new candidates never breaks
//! existing behavior.
//!
//! The table is an explicit value constructed once at startup and passed
//! into the resolver and controllers; tests substitute their own tables.

use std::collections::BTreeMap;

/// Well-known field names. Resolution is keyed by plain strings so callers
/// can register extra fields without touching this module.
pub mod field {
    pub const SEARCH_INPUT: &str = "search_input";
    pub const REGION_SUGGEST_ITEM: &str = "region_suggest_item";
    pub const NAVIGATION_TAB: &str = "navigation_tab";
    pub const PROPERTY_SIDEBAR: &str = "property_sidebar";
    pub const LIST_OPEN_BUTTON: &str = "list_open_button";
    pub const LIST_CONTAINER: &str = "list_container";
    pub const CARD_ROOT: &str = "card_root";
    pub const CARD_PRICE: &str = "card_price";
    pub const CARD_ADDRESS: &str = "card_address";
    pub const CARD_ADDRESS_HINT: &str = "card_address_hint";
    pub const CARD_REALTOR: &str = "card_realtor";
    pub const CARD_MAINTENANCE: &str = "card_maintenance";
    pub const CARD_TIME: &str = "card_time";
    pub const CARD_LINK: &str = "card_link";
    pub const LOAD_MORE: &str = "load_more";
    pub const PAGINATION_CONTAINER: &str = "pagination_container";
    pub const PAGINATION_NEXT: &str = "pagination_next";
    pub const PAGINATION_NUMBERS: &str = "pagination_numbers";
    pub const BLOCK_HINT: &str = "block_hint";
    pub const FILTER_TOGGLE_MORE: &str = "filter_toggle_more";
}

#[derive(Debug, Clone, Default)]
pub struct SelectorTable {
    fields: BTreeMap<String, Vec<String>>,
}

impl SelectorTable {
    /// Empty table; useful for test fixtures.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Candidate selector table for the current Dabang layout.
    pub fn dabang() -> Self {
        let mut table = Self::empty();

        table.register(
            field::SEARCH_INPUT,
            [
                "input#search-input",
                "input[placeholder*='검색']",
                "input[placeholder*='지역']",
                "input[type='search']",
            ],
        );
        table.register(
            field::REGION_SUGGEST_ITEM,
            [
                "button.sc-fEETNT.cGRZls",
                "button[class*='sc-fEETNT']",
                "a[role='link']",
                "a[href*='/map/']",
                "ul[role='listbox'] button",
                "ul[role='listbox'] li",
                "li a",
                "div[class*='auto'] li",
            ],
        );
        table.register(
            field::NAVIGATION_TAB,
            [
                "nav[class*='sc-eYRUSB'] a",
                "a[href='/map/onetwo']",
                "a[href*='/map/']",
            ],
        );
        table.register(
            field::PROPERTY_SIDEBAR,
            [
                "a[class*='sc-evlKSw'][class*='gfXolk']",
                "a[class*='sc-evlKSw']",
                "a[class*='sc-erobCP']",
            ],
        );
        table.register(
            field::LIST_OPEN_BUTTON,
            [
                "button.sc-hGqmkL.kOEMcC",
                "button[class*='sc-hGqmkL']",
                "button[class*='kOEMcC']",
            ],
        );
        table.register(
            field::LIST_CONTAINER,
            [
                "#onetwo-list",
                "#map-list-tab-container",
                "[id^='map-list-']",
                "[id^='dock-content-']",
                "#onetwo-list ul",
                "#map-list-tab-container ul",
                "#officetel-list",
                "div.officetel-list",
            ],
        );
        table.register(
            field::CARD_ROOT,
            [
                "li.sc-bNShyZ",
                "li[class^='sc-bNShyZ']",
                "#onetwo-list li",
                "#map-list-tab-container li[class*='sc-ouVgf'][class*='cuFXAJ']",
                "#map-list-tab-container li[class*='sc-bNShyz'][class*='kdCXHE']",
                "li[class*='sc-czXwGc']",
                "li[role='listitem']",
                "[data-testid*='room']",
                "article[class*='RoomCard']",
            ],
        );
        table.register(
            field::CARD_PRICE,
            [
                "p.sc-fLMXbb.jZjfUh",
                "p[class*='sc-fLMXbb']",
                "p.sc-doIiHy.jtStDE",
                "p[class*='sc-doIiHy']",
                "h1[class*='sc-gtGlis']",
                "div[class*='sc-eisxGE'] p",
                ".price",
                "[data-testid='price']",
                ".room-price",
            ],
        );
        table.register(
            field::CARD_ADDRESS,
            [
                "section[data-scroll-spy-element='near'] p",
                "p.sc-dPDzVR.iYQyEM",
                "p[class*='sc-hMraNJ']",
                "div[class*='location'] p",
                "div[class*='address'] p",
                "[data-testid='address']",
                ".address",
                ".addr",
            ],
        );
        table.register(
            field::CARD_ADDRESS_HINT,
            [
                "div[class*='sc-eisxGE']",
                "div[class*='hIWJxN']",
                "[data-testid='address']",
                ".address",
                ".addr",
            ],
        );
        table.register(
            field::CARD_REALTOR,
            [
                "p[class*='sc-cBzQip']",
                "p[class*='gCbNoQ']",
                "[class*='realtor']",
                "[class*='agent']",
            ],
        );
        table.register(
            field::CARD_MAINTENANCE,
            ["[class*='maintenance']", "[class*='maint']", "[class*='fee']"],
        );
        table.register(
            field::CARD_TIME,
            ["time", "[class*='posted']", "[class*='date']"],
        );
        table.register(
            field::CARD_LINK,
            [
                "a[href^='/room/']",
                "a[href*='detail_id=']",
                "a[class*='sc-dVMXWE']",
                "a[href*='detail']",
                "a[href]",
            ],
        );
        table.register(
            field::LOAD_MORE,
            ["button[aria-label*='더보기']", "button.load-more"],
        );
        table.register(
            field::PAGINATION_CONTAINER,
            [
                "div.sc-efUvXT.fvodgZ.pagination",
                "div[class*='pagination']",
                "nav[class*='pagination']",
                "ul[class*='pagination']",
                "nav[aria-label*='Pagination']",
            ],
        );
        table.register(
            field::PAGINATION_NEXT,
            [
                "div[class*='pagination'] button[aria-label*='다음']:not([disabled])",
                "button[aria-label*='다음']",
                "a[aria-label*='다음']",
                "a[rel='next']",
                "nav[aria-label*='Pagination'] button[aria-label*='다음']",
            ],
        );
        table.register(
            field::PAGINATION_NUMBERS,
            [
                "div[class*='pagination'] button",
                "nav[aria-label*='Pagination'] button",
                "ul[class*='pagination'] button",
            ],
        );
        table.register(
            field::BLOCK_HINT,
            ["iframe[src*='captcha']", "[id*='captcha']", "[class*='captcha']"],
        );
        table.register(
            field::FILTER_TOGGLE_MORE,
            ["div[role='button'][data-testid*='moreFilter']", "[class*='filter'] button"],
        );

        table
    }

    /// Replaces the candidate list of one field.
    pub fn register<I, S>(&mut self, field: &str, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(field.to_string(), candidates.into_iter().map(Into::into).collect());
    }

    /// Appends a lower-priority candidate to an existing field.
    pub fn append(&mut self, field: &str, candidate: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(candidate.into());
    }

    /// Ordered candidates for a field; empty slice for unregistered fields.
    pub fn candidates(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_is_empty() {
        let table = SelectorTable::dabang();
        assert!(table.candidates("no_such_field").is_empty());
    }

    #[test]
    fn test_candidate_order_is_preserved() {
        let mut table = SelectorTable::empty();
        table.register("price", [".new-price", ".price", "[data-testid='price']"]);
        let got = table.candidates("price");
        assert_eq!(got[0], ".new-price");
        assert_eq!(got[2], "[data-testid='price']");
    }

    #[test]
    fn test_append_keeps_earlier_candidates_first() {
        let mut table = SelectorTable::empty();
        table.register("price", [".price"]);
        table.append("price", ".legacy-price");
        let got = table.candidates("price");
        assert_eq!(got, &[".price".to_string(), ".legacy-price".to_string()]);
    }

    #[test]
    fn test_dabang_table_covers_core_fields() {
        let table = SelectorTable::dabang();
        for f in [
            field::SEARCH_INPUT,
            field::LIST_CONTAINER,
            field::CARD_ROOT,
            field::CARD_PRICE,
            field::CARD_ADDRESS,
            field::PAGINATION_NEXT,
            field::BLOCK_HINT,
        ] {
            assert!(!table.candidates(f).is_empty(), "missing candidates for {f}");
        }
    }
}
