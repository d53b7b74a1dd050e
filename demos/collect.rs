//! Collects listings for a region and writes them to CSV.
//!
//! ```
//! REGION="부산 기장군" cargo run --example collect
//! ```

use std::path::Path;

use dabang_scraper::export::save_csv;
use dabang_scraper::{PropertyType, ScrapeRequest, ScraperService};
use tower::Service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dabang_scraper=debug".into()),
        )
        .init();

    let region = std::env::var("REGION").unwrap_or_else(|_| "부산 기장군".to_string());

    let request = ScrapeRequest::new(&region)
        .with_property_types(vec![PropertyType::OneRoom, PropertyType::TwoRoom])
        .with_item_limit(100)
        .with_headless(true)
        .with_diagnostics(true);

    let mut service = ScraperService::new();

    println!("=== Dabang Collector ===");
    println!("region: {}", region);

    match service.call(request).await {
        Ok(outcome) => {
            println!(
                "collected {} listings from {} cards",
                outcome.listings.len(),
                outcome.total_cards
            );
            match save_csv(&outcome.listings, Path::new("./output"), &region) {
                Ok(path) => println!("saved: {:?}", path),
                Err(e) => eprintln!("export failed: {}", e),
            }
        }
        Err(e) => {
            eprintln!("crawl failed: {}", e);
        }
    }
}
