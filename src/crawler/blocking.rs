//! Block-page detection and zero-result diagnostics.

use std::fs;

use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::export::now_timestamp_str;
use crate::locate::{resolve_first, Scope};
use crate::selectors::{field, SelectorTable};

const BLOCK_KEYWORDS: [&str; 3] = ["captcha", "자동입력", "보안문자"];

/// Whether page markup carries one of the known block-page keywords.
pub fn contains_block_keywords(html: &str) -> bool {
    let lower = html.to_lowercase();
    BLOCK_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Checks the live page for a CAPTCHA iframe or block-page wording.
/// Detection failures count as "not blocked"; a missed block surfaces
/// later as an empty result.
pub async fn detect_block(page: &Page, table: &SelectorTable) -> bool {
    if resolve_first(&Scope::Page(page), table, field::BLOCK_HINT)
        .await
        .is_some()
    {
        warn!("block hint element present on page");
        return true;
    }
    match page.content().await {
        Ok(html) => {
            let blocked = contains_block_keywords(&html);
            if blocked {
                warn!("block keyword found in page content");
            }
            blocked
        }
        Err(e) => {
            debug!("content fetch for block check failed: {}", e);
            false
        }
    }
}

/// Dumps screenshot, HTML and run metadata for a zero-card pass. Entirely
/// best-effort: a failed dump only logs.
pub async fn dump_diagnostics(page: &Page, config: &ScraperConfig, tag: &str) {
    if let Err(e) = fs::create_dir_all(&config.debug_dir) {
        warn!("cannot create debug dir {}: {}", config.debug_dir.display(), e);
        return;
    }
    let stamp = now_timestamp_str();
    let stem = format!("empty_list_{}_{}", tag, stamp);

    match page
        .screenshot(ScreenshotParams::builder().full_page(true).build())
        .await
    {
        Ok(shot) => {
            let path = config.debug_dir.join(format!("{stem}.png"));
            if let Err(e) = fs::write(&path, &shot) {
                warn!("screenshot write failed: {}", e);
            } else {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&shot);
                debug!("diagnostic screenshot: data:image/png;base64,{}", encoded);
            }
        }
        Err(e) => warn!("screenshot capture failed: {}", e),
    }

    match page.content().await {
        Ok(html) => {
            let path = config.debug_dir.join(format!("{stem}.html"));
            if let Err(e) = fs::write(&path, html) {
                warn!("html dump failed: {}", e);
            }
        }
        Err(e) => warn!("html fetch failed: {}", e),
    }

    let url = page.url().await.ok().flatten().unwrap_or_default();
    let meta = json!({
        "tag": tag,
        "captured_at": stamp,
        "url": url,
    });
    let path = config.debug_dir.join(format!("{stem}.json"));
    if let Err(e) = fs::write(&path, meta.to_string()) {
        warn!("metadata dump failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_keywords_case_insensitive() {
        assert!(contains_block_keywords("<iframe src='/CAPTCHA/x'></iframe>"));
        assert!(contains_block_keywords("자동입력 방지 문자를 입력하세요"));
        assert!(contains_block_keywords("보안문자 확인"));
    }

    #[test]
    fn test_normal_page_is_not_blocked() {
        assert!(!contains_block_keywords("<ul id='onetwo-list'><li>월세 500/50</li></ul>"));
        assert!(!contains_block_keywords(""));
    }
}
