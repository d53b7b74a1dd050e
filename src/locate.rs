//! Locator resolution over a page or element scope.
//!
//! `resolve_first`/`resolve_all` walk a field's candidate selectors in table
//! order and stop at the first candidate that matches anything in the scope.
//! A fully missed field is an absence, never an error; callers substitute
//! empty/null values or fall back to whole-card text.

use std::future::Future;

use chromiumoxide::{Element, Page};
use tracing::debug;

use crate::selectors::SelectorTable;

/// Query scope: the whole page or one sub-tree (e.g. a listing card).
pub enum Scope<'a> {
    Page(&'a Page),
    Element(&'a Element),
}

impl Scope<'_> {
    /// All matches for one CSS selector. Query failures (detached nodes,
    /// invalid selector) count as zero matches.
    pub async fn query_all(&self, selector: &str) -> Vec<Element> {
        match self {
            Scope::Page(page) => page.find_elements(selector).await.unwrap_or_default(),
            Scope::Element(el) => el.find_elements(selector).await.unwrap_or_default(),
        }
    }
}

/// The one candidate walk the resolvers go through: queries candidates in
/// order and stops at the first yielding at least one result, returning
/// its index and results. Generic over the query function so the ordering
/// contract is testable without a browser.
pub async fn first_matching<F, Fut, T>(
    candidates: &[String],
    mut query: F,
) -> Option<(usize, Vec<T>)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Vec<T>>,
{
    for (idx, selector) in candidates.iter().enumerate() {
        let found = query(selector.clone()).await;
        if !found.is_empty() {
            return Some((idx, found));
        }
    }
    None
}

/// First element of the first matching candidate, or `None`.
pub async fn resolve_first(scope: &Scope<'_>, table: &SelectorTable, field: &str) -> Option<Element> {
    let walk = first_matching(table.candidates(field), |sel| async move {
        scope.query_all(&sel).await
    })
    .await;
    match walk {
        Some((_, mut found)) => Some(found.remove(0)),
        None => {
            debug!("no candidate matched for field '{}'", field);
            None
        }
    }
}

/// Every element of the first matching candidate, or empty.
pub async fn resolve_all(scope: &Scope<'_>, table: &SelectorTable, field: &str) -> Vec<Element> {
    let candidates = table.candidates(field);
    let walk = first_matching(candidates, |sel| async move { scope.query_all(&sel).await }).await;
    match walk {
        Some((idx, found)) => {
            debug!(
                "field '{}' resolved via '{}' ({} matches)",
                field,
                candidates[idx],
                found.len()
            );
            found
        }
        None => Vec::new(),
    }
}

/// First non-empty inner text found while walking the candidates. A matched
/// element with blank text does not satisfy the field, so this walk
/// deliberately continues past candidates whose elements carry no text.
pub async fn text_first(scope: &Scope<'_>, table: &SelectorTable, field: &str) -> Option<String> {
    for selector in table.candidates(field) {
        for el in scope.query_all(selector).await {
            if let Ok(Some(text)) = el.inner_text().await {
                let text = text.trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Clicks the first resolvable candidate. Returns whether a click landed.
/// A failed click moves on to the next candidate rather than giving up.
pub async fn click_first(scope: &Scope<'_>, table: &SelectorTable, field: &str) -> bool {
    for selector in table.candidates(field) {
        let mut found = scope.query_all(selector).await;
        if found.is_empty() {
            continue;
        }
        if found.remove(0).click().await.is_ok() {
            debug!("clicked field '{}' via '{}'", field, selector);
            return true;
        }
    }
    false
}
