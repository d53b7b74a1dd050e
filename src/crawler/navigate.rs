//! Navigation and filter state machine for the Dabang map view.
//!
//! Flow per category pass: open the category tab, resolve the region
//! keyword through the search box, apply sale-type filters, then open the
//! listing panel and wait for the list container to render.

use std::time::Duration;

use chromiumoxide::Page;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::locate::{click_first, resolve_all, resolve_first, Scope};
use crate::selectors::{field, SelectorTable};

use super::types::{PropertyType, SaleFilters};

const CONTAINER_POLL_MS: u64 = 500;
const SUGGEST_SETTLE_MS: u64 = 1000;

pub struct NavigationController<'a> {
    page: &'a Page,
    table: &'a SelectorTable,
    config: &'a ScraperConfig,
}

impl<'a> NavigationController<'a> {
    pub fn new(page: &'a Page, table: &'a SelectorTable, config: &'a ScraperConfig) -> Self {
        Self { page, table, config }
    }

    /// Lands on the map view for one property category.
    ///
    /// Prefers clicking the navigation tab (keeps SPA state); falls back to
    /// direct navigation on the category path when no tab takes.
    pub async fn open_category(&self, property_type: PropertyType) -> Result<(), ScraperError> {
        info!("opening category '{}'", property_type.label());
        self.page
            .goto(&self.config.base_url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        sleep(Duration::from_secs(2)).await;

        if self.on_category_path(property_type).await {
            return Ok(());
        }

        for tab_field in [field::NAVIGATION_TAB, field::PROPERTY_SIDEBAR] {
            for selector in self.table.candidates(tab_field) {
                if click_by_text(self.page, selector, property_type.tab_label()).await? {
                    sleep(Duration::from_secs(2)).await;
                    if self.on_category_path(property_type).await {
                        return Ok(());
                    }
                }
            }
        }

        debug!("tab click missed; navigating to category path directly");
        let url = format!("{}{}", self.config.base_url, property_type.category_path());
        self.page
            .goto(&url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    async fn on_category_path(&self, property_type: PropertyType) -> bool {
        match self.page.url().await {
            Ok(Some(url)) => url.contains(property_type.category_path()),
            _ => false,
        }
    }

    /// Resolves the region keyword through the search box.
    ///
    /// An empty keyword means "browse the current viewport": the search
    /// step is skipped and only the list panel is opened. A missing search
    /// input for a non-empty keyword is a hard failure.
    pub async fn search_region(&self, keyword: &str) -> Result<(), ScraperError> {
        if keyword.trim().is_empty() {
            info!("no region keyword; browsing current map viewport");
            return self.open_list_panel().await;
        }

        let input = resolve_first(&Scope::Page(self.page), self.table, field::SEARCH_INPUT)
            .await
            .ok_or_else(|| ScraperError::ElementNotFound("search input".to_string()))?;

        input
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        input
            .type_str(keyword)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        sleep(Duration::from_millis(SUGGEST_SETTLE_MS)).await;

        if self.pick_suggestion(keyword).await? {
            info!("region '{}' resolved via suggestion", keyword);
        } else {
            // last resort: submit the raw keyword
            debug!("no suggestion matched; submitting keyword with Enter");
            input
                .press_key("Enter")
                .await
                .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        }
        sleep(Duration::from_secs(2)).await;

        self.open_list_panel().await
    }

    /// Suggestion strategy, strongest match first:
    /// exact text, then partial text, then the first visible suggestion.
    async fn pick_suggestion(&self, keyword: &str) -> Result<bool, ScraperError> {
        for selector in self.table.candidates(field::REGION_SUGGEST_ITEM) {
            if click_by_text_exact(self.page, selector, keyword).await? {
                return Ok(true);
            }
        }

        // partial: any suggestion containing every keyword token
        let tokens: Vec<&str> = keyword.split_whitespace().collect();
        let items = resolve_all(&Scope::Page(self.page), self.table, field::REGION_SUGGEST_ITEM).await;
        for item in &items {
            if let Ok(Some(text)) = item.inner_text().await {
                if tokens.iter().all(|t| text.contains(t)) {
                    if item.click().await.is_ok() {
                        return Ok(true);
                    }
                }
            }
        }

        if let Some(first) = items.into_iter().next() {
            if first.click().await.is_ok() {
                debug!("fell back to first suggestion for '{}'", keyword);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Applies the room-structure narrowing and any presale filter
    /// selections. Entirely best-effort: the map still shows listings
    /// without them, so every miss is only logged.
    pub async fn apply_filters(&self, property_type: PropertyType, filters: &SaleFilters) {
        self.apply_room_structure(property_type).await;

        let plan = sale_filter_plan(filters);
        if plan.is_empty() {
            return;
        }
        for (toggle, labels) in plan {
            if !self.click_filter_text(toggle, false).await {
                debug!("filter group '{}' toggle not found", toggle);
                continue;
            }
            sleep(Duration::from_millis(600)).await;
            for label in labels {
                if self.click_filter_text(label, false).await {
                    info!("filter '{}' > '{}' applied", toggle, label);
                } else {
                    debug!("filter option '{}' not found", label);
                }
                sleep(Duration::from_millis(300)).await;
            }
            sleep(Duration::from_millis(400)).await;
        }
        self.press_escape().await;
    }

    /// One/two-room passes share the `/map/onetwo` view and are narrowed
    /// apart through 추가필터 > 방구조 > 원룸/투룸.
    async fn apply_room_structure(&self, property_type: PropertyType) {
        let Some(label) = room_structure_label(property_type) else {
            return;
        };
        info!("applying room-structure filter '{}'", label);

        let opened = click_first(&Scope::Page(self.page), self.table, field::FILTER_TOGGLE_MORE)
            .await
            || self.click_filter_text("추가필터", false).await;
        if !opened {
            debug!("filter panel toggle not found; room structure skipped");
            return;
        }
        sleep(Duration::from_millis(600)).await;

        if !self.click_filter_text("방구조", false).await {
            debug!("room-structure section not found");
            self.press_escape().await;
            return;
        }
        sleep(Duration::from_millis(400)).await;

        if self.click_filter_text(label, true).await {
            info!("room structure '{}' selected", label);
        } else {
            debug!("room-structure option '{}' not found", label);
        }
        self.press_escape().await;
    }

    /// Clicks the first clickable element carrying the given text, walking
    /// the element kinds the filter panel uses.
    async fn click_filter_text(&self, text: &str, exact: bool) -> bool {
        for selector in ["button", "div[role='button']", "label", "div"] {
            let landed = if exact {
                click_by_text_exact(self.page, selector, text).await
            } else {
                click_by_text(self.page, selector, text).await
            };
            match landed {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("text click '{}' via '{}' failed: {}", text, selector, e),
            }
        }
        false
    }

    async fn press_escape(&self) {
        if let Ok(body) = self.page.find_element("body").await {
            if let Err(e) = body.press_key("Escape").await {
                debug!("escape press failed: {}", e);
            }
        }
        sleep(Duration::from_millis(500)).await;
    }

    /// Opens the listing dock and waits for the list container.
    pub async fn open_list_panel(&self) -> Result<(), ScraperError> {
        if click_first(&Scope::Page(self.page), self.table, field::LIST_OPEN_BUTTON).await {
            debug!("list panel opened via button");
            sleep(Duration::from_secs(1)).await;
        }
        self.wait_for_container().await
    }

    /// Bounded poll for the list container; failure means the page never
    /// reached a listing state.
    pub async fn wait_for_container(&self) -> Result<(), ScraperError> {
        for _ in 0..self.config.container_poll_rounds {
            if resolve_first(&Scope::Page(self.page), self.table, field::LIST_CONTAINER)
                .await
                .is_some()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(CONTAINER_POLL_MS)).await;
        }
        warn!("list container never appeared");
        Err(ScraperError::Timeout(
            "list container did not appear within the poll bound".to_string(),
        ))
    }
}

/// Room-structure option to click for a category pass; only the one/two
/// room categories are narrowed this way.
fn room_structure_label(property_type: PropertyType) -> Option<&'static str> {
    match property_type {
        PropertyType::OneRoom => Some("원룸"),
        PropertyType::TwoRoom => Some("투룸"),
        _ => None,
    }
}

/// Toggle text and option labels per selected presale filter group, in
/// panel order. Empty groups are skipped entirely.
fn sale_filter_plan(filters: &SaleFilters) -> Vec<(&'static str, &[String])> {
    let groups: [(&'static str, &[String]); 4] = [
        ("건물유형", &filters.building_types),
        ("분양단계", &filters.stages),
        ("분양일정", &filters.schedules),
        ("공급유형", &filters.supply_types),
    ];
    groups
        .into_iter()
        .filter(|(_, labels)| !labels.is_empty())
        .collect()
}

/// Clicks the first element matching `selector` whose inner text contains
/// `text`. CSS alone cannot express text matching, so this goes through
/// page script.
pub async fn click_by_text(page: &Page, selector: &str, text: &str) -> Result<bool, ScraperError> {
    run_text_click(page, selector, text, false).await
}

/// Like [`click_by_text`] but requires the trimmed text to match exactly.
pub async fn click_by_text_exact(
    page: &Page,
    selector: &str,
    text: &str,
) -> Result<bool, ScraperError> {
    run_text_click(page, selector, text, true).await
}

async fn run_text_click(
    page: &Page,
    selector: &str,
    text: &str,
    exact: bool,
) -> Result<bool, ScraperError> {
    let script = format!(
        r#"(() => {{
            const sel = {sel};
            const want = {want};
            const exact = {exact};
            for (const el of document.querySelectorAll(sel)) {{
                const got = (el.innerText || '').trim();
                if (exact ? got === want : got.includes(want)) {{
                    el.click();
                    return true;
                }}
            }}
            return false;
        }})()"#,
        sel = json!(selector),
        want = json!(text),
        exact = exact,
    );

    let result = page
        .evaluate(script.as_str())
        .await
        .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
    Ok(result.into_value::<bool>().unwrap_or(false))
}
