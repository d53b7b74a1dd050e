//! CSV export for collected listings.
//!
//! Output files are named `dabang_{region}_{timestamp}.csv` under the
//! configured output directory. Rows are grouped by property type and keep
//! collection order within each group.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::crawler::types::Listing;
use crate::error::ScraperError;

const FILENAME_SLUG_MAX: usize = 60;

pub fn now_timestamp_str() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Region keyword reduced to a filename-safe slug: whitespace becomes `_`,
/// anything outside alphanumerics/Hangul/`_`/`-` is dropped, length capped.
pub fn slugify_for_filename(keyword: &str) -> String {
    let replaced: String = keyword
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || ('가'..='힣').contains(c)
                || *c == '_'
                || *c == '-'
        })
        .collect();
    let slug: String = replaced.chars().take(FILENAME_SLUG_MAX).collect();
    if slug.is_empty() {
        "all".to_string()
    } else {
        slug
    }
}

pub fn build_output_path(output_dir: &Path, region_keyword: &str, timestamp: &str) -> PathBuf {
    output_dir.join(format!(
        "dabang_{}_{}.csv",
        slugify_for_filename(region_keyword),
        timestamp
    ))
}

/// Writes listings to a timestamped CSV and returns the written path.
/// Creates the output directory on first use.
pub fn save_csv(
    listings: &[Listing],
    output_dir: &Path,
    region_keyword: &str,
) -> Result<PathBuf, ScraperError> {
    fs::create_dir_all(output_dir)?;
    let path = build_output_path(output_dir, region_keyword, &now_timestamp_str());

    let mut rows: Vec<&Listing> = listings.iter().collect();
    // stable: collection order survives inside each property-type group
    rows.sort_by(|a, b| a.property_type.cmp(&b.property_type));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "property_type",
        "address",
        "price_text",
        "price_won",
        "maintenance_fee_won",
        "realtor",
        "posted_at",
        "area_m2",
        "floor",
        "url",
        "item_id",
    ])?;
    for l in rows {
        let price_won = l.price_won.to_string();
        let maintenance = l
            .maintenance_fee_won
            .map(|v| v.to_string())
            .unwrap_or_default();
        let area = l.area_m2.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            l.property_type.as_str(),
            l.address.as_str(),
            l.price_text.as_str(),
            price_won.as_str(),
            maintenance.as_str(),
            l.realtor.as_str(),
            l.posted_at.as_str(),
            area.as_str(),
            l.floor.as_deref().unwrap_or(""),
            l.url.as_str(),
            l.item_id.as_str(),
        ])?;
    }
    writer.flush()?;

    info!("saved {} listings to {}", listings.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(property_type: &str, address: &str) -> Listing {
        Listing {
            address: address.to_string(),
            price_text: "월세 500/50".to_string(),
            price_won: 500_000,
            maintenance_fee_won: Some(50_000),
            realtor: "행복 공인중개사사무소".to_string(),
            posted_at: "2024-06-15".to_string(),
            property_type: property_type.to_string(),
            url: "https://www.dabangapp.com/room/abc".to_string(),
            item_id: "abc".to_string(),
            area_m2: Some(23.1),
            floor: Some("3층".to_string()),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify_for_filename("부산 기장군"), "부산_기장군");
        assert_eq!(slugify_for_filename("  seoul / 종로!  "), "seoul__종로");
        assert_eq!(slugify_for_filename(""), "all");
    }

    #[test]
    fn test_slug_length_cap() {
        let long = "가".repeat(200);
        assert_eq!(slugify_for_filename(&long).chars().count(), 60);
    }

    #[test]
    fn test_output_path_shape() {
        let path = build_output_path(Path::new("/tmp/out"), "부산 기장", "20240615_120000");
        assert_eq!(
            path,
            PathBuf::from("/tmp/out/dabang_부산_기장_20240615_120000.csv")
        );
    }

    #[test]
    fn test_save_csv_writes_header_and_rows() {
        let dir = std::env::temp_dir().join(format!(
            "dabang_export_test_{}_{}",
            std::process::id(),
            now_timestamp_str()
        ));
        let listings = vec![
            listing("투룸", "대변리 7"),
            listing("원룸", "청운동 12"),
        ];

        let path = save_csv(&listings, &dir, "기장").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("property_type,address,"));
        // grouped by property type
        assert!(lines[1].starts_with("원룸,청운동 12"));
        assert!(lines[2].starts_with("투룸,대변리 7"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
