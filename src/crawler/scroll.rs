//! Scroll and pagination control over the listing panel.
//!
//! Growth is observed through the card count, never through scroll offsets:
//! only a changed count proves the list actually grew. A stability counter
//! guards against both premature exit (one slow network round) and endless
//! scrolling (virtualized lists that keep firing scroll events).

use std::time::Duration;

use chromiumoxide::{Element, Page};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::locate::{resolve_all, resolve_first, Scope};
use crate::selectors::{field, SelectorTable};
use crate::signal::PauseSignal;

use super::blocking::detect_block;

const ADVANCE_POLL_ROUNDS: usize = 20;
const ADVANCE_POLL_MS: u64 = 250;

/// What the tracker wants next after observing a card count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollVerdict {
    /// Keep scrolling.
    Continue,
    /// Count has been stable long enough; try load-more/next-page once.
    TryAdvance,
    /// Round ceiling reached; stop unconditionally.
    Exhausted,
}

/// Pure bounded-growth state machine, one instance per page of results.
#[derive(Debug)]
pub struct ScrollTracker {
    last_count: usize,
    stable_rounds: u32,
    rounds: usize,
    max_rounds: usize,
    stability_threshold: u32,
}

impl ScrollTracker {
    pub fn new(max_rounds: usize, stability_threshold: u32) -> Self {
        Self {
            last_count: 0,
            stable_rounds: 0,
            rounds: 0,
            max_rounds,
            stability_threshold,
        }
    }

    /// Feeds one observed card count and advances the round counter.
    pub fn observe(&mut self, count: usize) -> ScrollVerdict {
        self.rounds += 1;
        if self.rounds >= self.max_rounds {
            return ScrollVerdict::Exhausted;
        }
        if count > self.last_count {
            self.last_count = count;
            self.stable_rounds = 0;
            return ScrollVerdict::Continue;
        }
        self.stable_rounds += 1;
        if self.stable_rounds >= self.stability_threshold {
            ScrollVerdict::TryAdvance
        } else {
            ScrollVerdict::Continue
        }
    }

    /// Resets the stability streak after a successful advance so the next
    /// page gets its full settling budget.
    pub fn reset_stability(&mut self) {
        self.stable_rounds = 0;
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }
}

pub struct ScrollController<'a> {
    page: &'a Page,
    table: &'a SelectorTable,
    config: &'a ScraperConfig,
    signal: &'a PauseSignal,
}

impl<'a> ScrollController<'a> {
    pub fn new(
        page: &'a Page,
        table: &'a SelectorTable,
        config: &'a ScraperConfig,
        signal: &'a PauseSignal,
    ) -> Self {
        Self {
            page,
            table,
            config,
            signal,
        }
    }

    async fn container(&self) -> Option<Element> {
        resolve_first(&Scope::Page(self.page), self.table, field::LIST_CONTAINER).await
    }

    async fn card_count(&self) -> usize {
        resolve_all(&Scope::Page(self.page), self.table, field::CARD_ROOT)
            .await
            .len()
    }

    async fn scroll_container_to_bottom(&self) {
        if let Some(container) = self.container().await {
            if let Err(e) = container
                .call_js_fn("function() { this.scrollTop = this.scrollHeight; }", false)
                .await
            {
                debug!("container scroll failed: {}", e);
            }
        }
    }

    /// Surfaces every card reachable on the current page without paging:
    /// scroll, wait, re-count, with load-more clicks once the count goes
    /// stable. Returns the final card count.
    pub async fn grow_page(&self) -> usize {
        self.run_growth_loop(false).await
    }

    /// Full single-pass surface: like [`grow_page`](Self::grow_page) but a
    /// stable count also tries the pagination-next control, so one call
    /// walks every page. Used when the caller does not paginate itself.
    pub async fn surface_all(&self) -> usize {
        self.run_growth_loop(true).await
    }

    async fn run_growth_loop(&self, follow_pagination: bool) -> usize {
        let mut tracker =
            ScrollTracker::new(self.config.max_scroll_rounds, self.config.stability_threshold);

        loop {
            if self.signal.should_stop() {
                info!("stop requested; ending scroll loop");
                break;
            }
            self.signal.wait_if_paused().await;

            if detect_block(self.page, self.table).await {
                warn!("block page detected during scrolling; pausing for operator");
                self.signal.request_pause();
                self.signal.wait_if_paused().await;
                if self.signal.should_stop() {
                    break;
                }
            }

            self.scroll_container_to_bottom().await;
            sleep(self.config.scroll_pause).await;

            let count = self.card_count().await;
            match tracker.observe(count) {
                ScrollVerdict::Continue => {}
                ScrollVerdict::Exhausted => {
                    info!("scroll round ceiling reached at {} cards", count);
                    break;
                }
                ScrollVerdict::TryAdvance => {
                    let advanced = if self.try_load_more().await {
                        true
                    } else if follow_pagination {
                        self.click_next_page().await
                    } else {
                        false
                    };
                    if advanced {
                        tracker.reset_stability();
                        sleep(self.config.scroll_pause).await;
                    } else {
                        debug!("no further growth control; list exhausted at {}", count);
                        break;
                    }
                }
            }
        }
        tracker.last_count()
    }

    async fn try_load_more(&self) -> bool {
        for selector in self.table.candidates(field::LOAD_MORE) {
            let found = Scope::Page(self.page).query_all(selector).await;
            for el in found {
                if element_disabled(&el).await {
                    continue;
                }
                if el.click().await.is_ok() {
                    debug!("load-more clicked via '{}'", selector);
                    return true;
                }
            }
        }
        false
    }

    /// Clicks the pagination-next control (or the numerically next page
    /// button) and returns whether the click landed.
    async fn click_next_page(&self) -> bool {
        for selector in self.table.candidates(field::PAGINATION_NEXT) {
            let found = Scope::Page(self.page).query_all(selector).await;
            for el in found {
                if element_disabled(&el).await {
                    continue;
                }
                if el.click().await.is_ok() {
                    debug!("pagination next clicked via '{}'", selector);
                    return true;
                }
            }
        }

        // no explicit next control; look for the number after the current page
        if resolve_first(&Scope::Page(self.page), self.table, field::PAGINATION_CONTAINER)
            .await
            .is_none()
        {
            return false;
        }
        let buttons = resolve_all(&Scope::Page(self.page), self.table, field::PAGINATION_NUMBERS).await;
        let mut saw_current = false;
        for b in buttons {
            let is_current = matches!(
                b.attribute("aria-current").await,
                Ok(Some(v)) if !v.is_empty()
            );
            if is_current {
                saw_current = true;
                continue;
            }
            if saw_current && !element_disabled(&b).await && b.click().await.is_ok() {
                debug!("clicked numerically next page button");
                return true;
            }
        }
        false
    }

    /// Moves to the next result page and waits until the first card's
    /// identity changes, proving new content rendered. `false` means the
    /// last page was reached.
    pub async fn advance_page(&self) -> bool {
        let before = self.first_card_identity().await;

        self.scroll_container_to_bottom().await;
        sleep(Duration::from_millis(400)).await;

        if !self.click_next_page().await {
            return false;
        }

        for _ in 0..ADVANCE_POLL_ROUNDS {
            sleep(Duration::from_millis(ADVANCE_POLL_MS)).await;
            let after = self.first_card_identity().await;
            if after.is_some() && after != before {
                return true;
            }
        }
        warn!("next-page click landed but content never changed");
        false
    }

    /// Identity snapshot of the first visible card, used to detect a page
    /// transition.
    async fn first_card_identity(&self) -> Option<String> {
        let cards = resolve_all(&Scope::Page(self.page), self.table, field::CARD_ROOT).await;
        let first = cards.into_iter().next()?;
        match first.inner_text().await {
            Ok(Some(text)) => {
                let trimmed = text.trim().to_string();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }
}

async fn element_disabled(el: &Element) -> bool {
    matches!(el.attribute("disabled").await, Ok(Some(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_resets_stability() {
        let mut tracker = ScrollTracker::new(50, 4);
        assert_eq!(tracker.observe(10), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(10), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(10), ScrollVerdict::Continue);
        // growth just before the threshold starts the streak over
        assert_eq!(tracker.observe(24), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(24), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(24), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(24), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(24), ScrollVerdict::TryAdvance);
        assert_eq!(tracker.last_count(), 24);
    }

    #[test]
    fn test_stable_count_requests_advance_after_threshold() {
        let mut tracker = ScrollTracker::new(50, 4);
        tracker.observe(5);
        for _ in 0..3 {
            assert_eq!(tracker.observe(5), ScrollVerdict::Continue);
        }
        assert_eq!(tracker.observe(5), ScrollVerdict::TryAdvance);
    }

    #[test]
    fn test_round_ceiling_terminates() {
        let mut tracker = ScrollTracker::new(50, 4);
        let mut verdict = ScrollVerdict::Continue;
        // monotonically growing list never goes stable, ceiling must fire
        for count in 1..=60 {
            verdict = tracker.observe(count);
            if verdict == ScrollVerdict::Exhausted {
                break;
            }
        }
        assert_eq!(verdict, ScrollVerdict::Exhausted);
    }

    #[test]
    fn test_reset_stability_gives_fresh_budget() {
        let mut tracker = ScrollTracker::new(50, 4);
        tracker.observe(5);
        for _ in 0..4 {
            tracker.observe(5);
        }
        tracker.reset_stability();
        assert_eq!(tracker.observe(5), ScrollVerdict::Continue);
    }

    #[test]
    fn test_shrinking_count_counts_as_stable() {
        // virtualized lists can recycle nodes; a smaller count is not growth
        let mut tracker = ScrollTracker::new(50, 2);
        tracker.observe(20);
        assert_eq!(tracker.observe(18), ScrollVerdict::Continue);
        assert_eq!(tracker.observe(18), ScrollVerdict::TryAdvance);
        assert_eq!(tracker.last_count(), 20);
    }
}
