//! Two-phase, order-preserving listing dedup.
//!
//! Phase one drops rows whose non-empty URL was already seen; rows without
//! a URL always survive this phase. Phase two drops rows repeating an
//! (address, price) combination. Both phases keep the first occurrence, so
//! running the pipeline twice is a no-op.

use std::collections::HashSet;

use tracing::info;

use crate::crawler::types::Listing;

/// Removes repeated URLs, keeping first-seen order. Empty URLs never
/// collide with each other.
pub fn dedup_by_url(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen: HashSet<String> = HashSet::new();
    listings
        .into_iter()
        .filter(|l| l.url.is_empty() || seen.insert(l.url.clone()))
        .collect()
}

/// Removes repeated (address, price_won) combinations, keeping first-seen
/// order.
pub fn dedup_by_address_price(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    listings
        .into_iter()
        .filter(|l| seen.insert((l.address.clone(), l.price_won)))
        .collect()
}

/// Full pipeline: URL pass, then address+price pass.
pub fn dedup_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let before = listings.len();
    let result = dedup_by_address_price(dedup_by_url(listings));
    if result.len() < before {
        info!(
            "dedup removed {} of {} listings",
            before - result.len(),
            before
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(address: &str, price_won: i64, url: &str) -> Listing {
        Listing {
            address: address.to_string(),
            price_text: String::new(),
            price_won,
            maintenance_fee_won: None,
            realtor: String::new(),
            posted_at: "2024-06-15".to_string(),
            property_type: "원룸".to_string(),
            url: url.to_string(),
            item_id: url.to_string(),
            area_m2: None,
            floor: None,
        }
    }

    #[test]
    fn test_url_dup_keeps_first() {
        let input = vec![
            listing("청운동 12", 500_000, "https://x/room/a"),
            listing("대변리 7", 300_000, "https://x/room/b"),
            listing("청운동 12 재등록", 500_000, "https://x/room/a"),
        ];
        let got = dedup_by_url(input);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].address, "청운동 12");
        assert_eq!(got[1].address, "대변리 7");
    }

    #[test]
    fn test_urlless_rows_survive_url_pass() {
        let input = vec![
            listing("청운동 12", 500_000, ""),
            listing("대변리 7", 300_000, ""),
        ];
        assert_eq!(dedup_by_url(input).len(), 2);
    }

    #[test]
    fn test_urlless_addr_price_dup_collapses() {
        let input = vec![
            listing("청운동 12", 500_000, ""),
            listing("청운동 12", 500_000, ""),
            listing("청운동 12", 450_000, ""),
        ];
        let got = dedup_listings(input);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].price_won, 500_000);
        assert_eq!(got[1].price_won, 450_000);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let input = vec![
            listing("청운동 12", 500_000, "https://x/room/a"),
            listing("청운동 12", 500_000, "https://x/room/b"),
            listing("대변리 7", 300_000, ""),
            listing("대변리 7", 300_000, "https://x/room/c"),
        ];
        let once = dedup_listings(input);
        let twice = dedup_listings(once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.item_id, b.item_id);
        }
    }

    #[test]
    fn test_order_preserved() {
        let input = vec![
            listing("a동 1", 1, "u1"),
            listing("b동 2", 2, "u2"),
            listing("c동 3", 3, "u3"),
            listing("b동 2", 2, "u2"),
        ];
        let got = dedup_listings(input);
        let addrs: Vec<_> = got.iter().map(|l| l.address.as_str()).collect();
        assert_eq!(addrs, vec!["a동 1", "b동 2", "c동 3"]);
    }
}
