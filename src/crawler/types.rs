//! Request, record and session-mode types for the Dabang crawler.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// Property category, mapped onto the site's map-view routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    OneRoom,
    TwoRoom,
    Officetel,
    Apartment,
    House,
    Villa,
    /// Expands to every concrete category.
    All,
}

impl PropertyType {
    /// Human-readable Korean label used in output rows.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::OneRoom => "원룸",
            PropertyType::TwoRoom => "투룸",
            PropertyType::Officetel => "오피스텔",
            PropertyType::Apartment => "아파트",
            PropertyType::House => "주택",
            PropertyType::Villa => "빌라",
            PropertyType::All => "전체",
        }
    }

    /// Label of the top navigation tab that opens this category.
    pub fn tab_label(&self) -> &'static str {
        match self {
            PropertyType::OneRoom | PropertyType::TwoRoom => "원/투룸",
            PropertyType::Officetel => "오피스텔",
            PropertyType::Apartment => "아파트",
            PropertyType::House | PropertyType::Villa => "주택/빌라",
            PropertyType::All => "원/투룸",
        }
    }

    /// Map-view path for direct navigation when tab clicking fails.
    pub fn category_path(&self) -> &'static str {
        match self {
            PropertyType::OneRoom | PropertyType::TwoRoom => "/map/onetwo",
            PropertyType::Officetel => "/map/officetel",
            PropertyType::Apartment => "/map/apt",
            PropertyType::House | PropertyType::Villa => "/map/house",
            PropertyType::All => "/map/onetwo",
        }
    }

    /// Concrete categories this value stands for.
    pub fn expand(&self) -> Vec<PropertyType> {
        match self {
            PropertyType::All => vec![
                PropertyType::OneRoom,
                PropertyType::TwoRoom,
                PropertyType::Officetel,
                PropertyType::Apartment,
                PropertyType::House,
                PropertyType::Villa,
            ],
            other => vec![*other],
        }
    }
}

impl FromStr for PropertyType {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "원룸" | "oneroom" | "one_room" | "room1" => Ok(PropertyType::OneRoom),
            "투룸" | "tworoom" | "two_room" | "room2" => Ok(PropertyType::TwoRoom),
            "오피스텔" | "officetel" => Ok(PropertyType::Officetel),
            "아파트" | "apartment" | "apt" => Ok(PropertyType::Apartment),
            "주택" | "house" => Ok(PropertyType::House),
            "빌라" | "villa" => Ok(PropertyType::Villa),
            "전체" | "all" => Ok(PropertyType::All),
            other => Err(ScraperError::Extraction(format!(
                "unknown property type: {other}"
            ))),
        }
    }
}

/// Presale (분양) filter selections, one label list per filter group.
/// Labels are the button texts shown in the filter panel; empty lists
/// leave that group untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilters {
    /// 건물유형: 아파트, 오피스텔, 도시형생활주택.
    pub building_types: Vec<String>,
    /// 분양단계: 분양예정, 접수중, 접수마감, 입주예정.
    pub stages: Vec<String>,
    /// 분양일정: 모집공고, 특별공급, 1순위청약, ...
    pub schedules: Vec<String>,
    /// 공급유형: 공공분양, 민간분양, 공공임대, 민간임대.
    pub supply_types: Vec<String>,
}

impl SaleFilters {
    pub fn is_empty(&self) -> bool {
        self.building_types.is_empty()
            && self.stages.is_empty()
            && self.schedules.is_empty()
            && self.supply_types.is_empty()
    }
}

/// One crawl request: a region keyword, the categories to sweep and the
/// collection bounds. Built with `with_*` chaining.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// Region search keyword; empty means browse the current map viewport.
    pub region_keyword: String,
    pub property_types: Vec<PropertyType>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    /// Per-category cap on collected records. 0 means unbounded.
    pub item_limit: usize,
    /// Cap on result pages walked per category. 0 means unbounded.
    pub page_limit: usize,
    pub sale_filters: SaleFilters,
    pub headless: bool,
    pub dedupe: bool,
    /// Dump screenshot/HTML when a pass ends with zero cards.
    pub diagnostics: bool,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            region_keyword: String::new(),
            property_types: vec![PropertyType::OneRoom],
            price_min: None,
            price_max: None,
            item_limit: 0,
            page_limit: 0,
            sale_filters: SaleFilters::default(),
            headless: true,
            dedupe: true,
            diagnostics: false,
        }
    }
}

impl ScrapeRequest {
    pub fn new(region_keyword: impl Into<String>) -> Self {
        Self {
            region_keyword: region_keyword.into(),
            ..Self::default()
        }
    }

    pub fn with_property_types(mut self, types: Vec<PropertyType>) -> Self {
        self.property_types = types;
        self
    }

    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_item_limit(mut self, limit: usize) -> Self {
        self.item_limit = limit;
        self
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_sale_filters(mut self, filters: SaleFilters) -> Self {
        self.sale_filters = filters;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Concrete categories to sweep, with `All` expanded and duplicates
    /// removed while keeping first-seen order.
    pub fn expanded_types(&self) -> Vec<PropertyType> {
        let mut seen = Vec::new();
        for pt in &self.property_types {
            for concrete in pt.expand() {
                if !seen.contains(&concrete) {
                    seen.push(concrete);
                }
            }
        }
        seen
    }
}

/// One collected listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub address: String,
    pub price_text: String,
    pub price_won: i64,
    pub maintenance_fee_won: Option<i64>,
    pub realtor: String,
    /// Y-M-D posting date, resolved from relative phrases.
    pub posted_at: String,
    pub property_type: String,
    pub url: String,
    pub item_id: String,
    pub area_m2: Option<f64>,
    pub floor: Option<String>,
}

/// Everything one crawl run produced.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub listings: Vec<Listing>,
    pub region_keyword: String,
    /// Cards seen across all passes, before parsing and dedup.
    pub total_cards: usize,
}

/// Browser visibility mode for one session attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Headless,
    Interactive,
}

impl SessionMode {
    pub fn headless(&self) -> bool {
        matches!(self, SessionMode::Headless)
    }
}

/// Session modes to attempt in order. A headless request gets one
/// interactive retry when the headless pass yields nothing; an
/// interactive request is attempted once.
pub fn retry_modes(headless: bool) -> Vec<SessionMode> {
    if headless {
        vec![SessionMode::Headless, SessionMode::Interactive]
    } else {
        vec![SessionMode::Interactive]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = ScrapeRequest::new("부산 기장")
            .with_property_types(vec![PropertyType::Officetel])
            .with_item_limit(30)
            .with_headless(false)
            .with_dedupe(false);

        assert_eq!(req.region_keyword, "부산 기장");
        assert_eq!(req.property_types, vec![PropertyType::Officetel]);
        assert_eq!(req.item_limit, 30);
        assert!(!req.headless);
        assert!(!req.dedupe);
        // untouched defaults
        assert_eq!(req.page_limit, 0);
        assert!(!req.diagnostics);
    }

    #[test]
    fn test_property_type_from_str() {
        assert_eq!("원룸".parse::<PropertyType>().unwrap(), PropertyType::OneRoom);
        assert_eq!("oneroom".parse::<PropertyType>().unwrap(), PropertyType::OneRoom);
        assert_eq!("아파트".parse::<PropertyType>().unwrap(), PropertyType::Apartment);
        assert_eq!("all".parse::<PropertyType>().unwrap(), PropertyType::All);
        assert!("창고".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_all_expands_to_six_concrete_types() {
        let req = ScrapeRequest::new("서울").with_property_types(vec![PropertyType::All]);
        let types = req.expanded_types();
        assert_eq!(types.len(), 6);
        assert!(!types.contains(&PropertyType::All));
    }

    #[test]
    fn test_expanded_types_deduplicates() {
        let req = ScrapeRequest::new("서울")
            .with_property_types(vec![PropertyType::OneRoom, PropertyType::All]);
        let types = req.expanded_types();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0], PropertyType::OneRoom);
    }

    #[test]
    fn test_category_routes() {
        assert_eq!(PropertyType::TwoRoom.category_path(), "/map/onetwo");
        assert_eq!(PropertyType::Apartment.category_path(), "/map/apt");
        assert_eq!(PropertyType::Villa.tab_label(), "주택/빌라");
    }

    #[test]
    fn test_sale_filters_empty_check() {
        assert!(SaleFilters::default().is_empty());
        let filters = SaleFilters {
            stages: vec!["접수중".to_string()],
            ..SaleFilters::default()
        };
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_retry_modes() {
        assert_eq!(
            retry_modes(true),
            vec![SessionMode::Headless, SessionMode::Interactive]
        );
        assert_eq!(retry_modes(false), vec![SessionMode::Interactive]);
    }
}
