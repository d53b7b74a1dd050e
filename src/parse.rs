//! Pure text normalizers for captured listing fields.
//!
//! Everything in this module is stateless and referentially transparent so
//! the parsing grammar can be tested without a browser session. Functions
//! that depend on the clock take `now` explicitly; thin wrappers bind
//! `Local::now()` for production callers.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
// astral-plane codepoints (emoji etc.) that leak into card text
static EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{10000}-\u{10FFFF}]").unwrap());
static PRICE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)").unwrap());
static MAINT_FEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(만|천)?\s*원?").unwrap());

// lot address: neighborhood unit (동/읍/면/리) + lot number, optional sub-lot
static LOT_ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣]+(?:동|읍|면|리)\s*\d+(?:-\d+)?)").unwrap());
// road-name address: ...로/길 + number
static ROAD_ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣]+(?:가|로|길)\s*\d+(?:-\d+)?)").unwrap());
// administrative address: 시/도 + 시/군/구 + one or more 동/읍/면/리 segments
static ADMIN_ADDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:[가-힣]{2,}(?:특별|광역)?시|[가-힣]{2,}도)\s*[가-힣]+(?:시|군|구)(?:\s*[가-힣]+(?:동|읍|면|리))+(?:\s*\d+(?:-\d+)?)?)",
    )
    .unwrap()
});

static AREA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:㎡|m²|m2)").unwrap());
static FLOOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(지하\d+층|옥탑|반지하|저층|중층|고층|\d+층)").unwrap());

static REL_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(분|시간|일)\s*전").unwrap());
static ABS_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})[./-](\d{1,2})[./-](\d{1,2})").unwrap());

static PRICE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:전세|월세|매매)\s*[0-9억만원/\s,]+|\d{1,3}(?:,\d{3})*(?:원)?\s*(?:/\s*\d{1,3}(?:,\d{3})*)?)")
        .unwrap()
});

static REALTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣A-Za-z0-9·\s]{2,}?(?:공인중개사사무소|부동산))").unwrap());

pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

pub fn strip_emojis(text: &str) -> String {
    EMOJI_RE.replace_all(text, "").into_owned()
}

/// Converts a Korean money string to won.
///
/// Unit suffixes: 만 = x10,000, 천 = x1,000, 원 = literal. When the text
/// carries a monthly-rent (월세) or maintenance-fee (관리비) token, the
/// amount following that token wins over any earlier amount, so
/// "보증금 500/월세 50만" resolves to 500,000 (the monthly figure).
/// Missing or unparseable input yields 0.
pub fn parse_price_to_won(text: &str) -> i64 {
    let s = normalize_whitespace(&strip_emojis(text));
    if s.is_empty() {
        return 0;
    }

    for keyword in ["월세", "관리비"] {
        if let Some(idx) = s.find(keyword) {
            let tail = &s[idx + keyword.len()..];
            let amount = parse_single_amount(tail);
            if amount > 0 {
                return amount;
            }
        }
    }

    parse_single_amount(&s)
}

fn parse_single_amount(text: &str) -> i64 {
    let s = text.replace(',', "");
    let Some(caps) = PRICE_NUMBER_RE.captures(&s) else {
        return 0;
    };
    let num: i64 = caps[1].parse().unwrap_or(0);
    if s.contains('만') {
        num * 10_000
    } else if s.contains('천') {
        num * 1_000
    } else {
        // with or without a trailing 원, bare numbers are won
        num
    }
}

/// Maintenance fee in won; an explicit "none" token (없음) yields `None`.
pub fn parse_maintenance_fee_won(text: &str) -> Option<i64> {
    let s = text.replace(',', "");
    let s = s.trim();
    if s.is_empty() || s.contains('없') {
        return None;
    }
    let caps = MAINT_FEE_RE.captures(s)?;
    let num: i64 = caps[1].parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("만") => Some(num * 10_000),
        Some("천") => Some(num * 1_000),
        _ => Some(num),
    }
}

/// Lot-number address out of free-form card text.
///
/// Priority: 동/읍/면/리 + lot number, then road-name + number, then a bare
/// administrative address. `None` means the card has no usable address and
/// must be discarded by the caller.
pub fn extract_lot_address(text: &str) -> Option<String> {
    let s = normalize_whitespace(&strip_emojis(text));
    if s.is_empty() {
        return None;
    }
    if let Some(caps) = LOT_ADDR_RE.captures(&s) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = ROAD_ADDR_RE.captures(&s) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = ADMIN_ADDR_RE.captures(&s) {
        return Some(caps[1].to_string());
    }
    None
}

pub fn extract_area_m2(text: &str) -> Option<f64> {
    AREA_RE.captures(text).and_then(|c| c[1].parse().ok())
}

pub fn extract_floor(text: &str) -> Option<String> {
    FLOOR_RE.captures(text).map(|c| c[1].to_string())
}

/// First 전세/월세/매매 phrase or bare amount line in the text.
pub fn extract_price_text(text: &str) -> Option<String> {
    let s = text.replace('\n', " ");
    PRICE_TEXT_RE.captures(&s).map(|c| c[1].trim().to_string())
}

pub fn extract_realtor(text: &str) -> Option<String> {
    REALTOR_RE
        .captures(text.trim())
        .map(|c| c[1].trim().to_string())
}

/// Resolves "N분/시간/일 전" against `now`, or parses an explicit Y-M-D
/// token. Unrecognized input yields `None`.
pub fn to_absolute_time_at(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    if let Some(caps) = REL_TIME_RE.captures(text) {
        let n: i64 = caps[1].parse().ok()?;
        let delta = match &caps[2] {
            "분" => Duration::minutes(n),
            "시간" => Duration::hours(n),
            "일" => Duration::days(n),
            _ => return None,
        };
        return Some(now - delta);
    }
    if let Some(caps) = ABS_DATE_RE.captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single();
    }
    None
}

pub fn to_absolute_time(text: &str) -> Option<DateTime<Local>> {
    to_absolute_time_at(text, Local::now())
}

/// Y-M-D string for a posted-at field, falling back to the current date
/// when the text carries no recognizable time information.
pub fn to_ymd_at(text: &str, now: DateTime<Local>) -> String {
    to_absolute_time_at(text, now)
        .unwrap_or(now)
        .format("%Y-%m-%d")
        .to_string()
}

pub fn to_ymd(text: &str) -> String {
    to_ymd_at(text, Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_man_won_multiplies() {
        assert_eq!(parse_price_to_won("200만원"), 2_000_000);
        assert_eq!(parse_price_to_won("45만"), 450_000);
    }

    #[test]
    fn test_price_literal_won() {
        assert_eq!(parse_price_to_won("150,000원"), 150_000);
        assert_eq!(parse_price_to_won("3,500"), 3_500);
    }

    #[test]
    fn test_price_monthly_wins_over_deposit() {
        assert_eq!(parse_price_to_won("보증금 500/월세 50만"), 500_000);
        assert_eq!(parse_price_to_won("월세 30만원"), 300_000);
    }

    #[test]
    fn test_price_thousand_unit() {
        assert_eq!(parse_price_to_won("5천원"), 5_000);
    }

    #[test]
    fn test_price_unparseable_is_zero() {
        assert_eq!(parse_price_to_won(""), 0);
        assert_eq!(parse_price_to_won("가격 문의"), 0);
    }

    #[test]
    fn test_maintenance_none_token() {
        assert_eq!(parse_maintenance_fee_won("관리비 없음"), None);
        assert_eq!(parse_maintenance_fee_won("없음"), None);
        assert_eq!(parse_maintenance_fee_won(""), None);
    }

    #[test]
    fn test_maintenance_amounts() {
        assert_eq!(parse_maintenance_fee_won("관리비 5만"), Some(50_000));
        assert_eq!(parse_maintenance_fee_won("관리비 150,000원"), Some(150_000));
        assert_eq!(parse_maintenance_fee_won("3천원"), Some(3_000));
    }

    #[test]
    fn test_lot_address_neighborhood_pattern() {
        assert_eq!(
            extract_lot_address("부산광역시 기장군 기장읍 대변리 123-4"),
            Some("대변리 123-4".to_string())
        );
        assert_eq!(
            extract_lot_address("서울 종로구 청운동 12"),
            Some("청운동 12".to_string())
        );
    }

    #[test]
    fn test_lot_address_road_fallback() {
        assert_eq!(
            extract_lot_address("해운대로 570-1 근처 신축"),
            Some("해운대로 570-1".to_string())
        );
    }

    #[test]
    fn test_lot_address_admin_fallback() {
        assert_eq!(
            extract_lot_address("부산광역시 기장군 기장읍"),
            Some("부산광역시 기장군 기장읍".to_string())
        );
    }

    #[test]
    fn test_lot_address_none_when_no_pattern() {
        assert_eq!(extract_lot_address("월세 50/5 신축 풀옵션"), None);
        assert_eq!(extract_lot_address(""), None);
    }

    #[test]
    fn test_area_and_floor() {
        assert_eq!(extract_area_m2("전용 23.14㎡, 3층"), Some(23.14));
        assert_eq!(extract_area_m2("m2 없음"), None);
        assert_eq!(extract_floor("전용 23㎡, 3층"), Some("3층".to_string()));
        assert_eq!(extract_floor("반지하 원룸"), Some("반지하".to_string()));
        assert_eq!(extract_floor("no floor"), None);
    }

    #[test]
    fn test_price_text_extraction() {
        assert_eq!(
            extract_price_text("기장읍\n월세 500/50 관리비 5만"),
            Some("월세 500/50".to_string())
        );
    }

    #[test]
    fn test_realtor_extraction() {
        assert_eq!(
            extract_realtor("행복 공인중개사사무소"),
            Some("행복 공인중개사사무소".to_string())
        );
        assert_eq!(extract_realtor("집주인 직거래"), None);
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_time_resolution() {
        let now = fixed_now();
        assert_eq!(
            to_absolute_time_at("3시간 전", now),
            Some(now - Duration::hours(3))
        );
        assert_eq!(
            to_absolute_time_at("10분 전", now),
            Some(now - Duration::minutes(10))
        );
        assert_eq!(
            to_absolute_time_at("2일 전", now),
            Some(now - Duration::days(2))
        );
    }

    #[test]
    fn test_absolute_date_parsing() {
        let got = to_absolute_time_at("2024-01-05 등록", fixed_now()).unwrap();
        assert_eq!(got.format("%Y-%m-%d").to_string(), "2024-01-05");
    }

    #[test]
    fn test_unrecognized_time_is_none() {
        assert_eq!(to_absolute_time_at("방금", fixed_now()), None);
    }

    #[test]
    fn test_to_ymd_falls_back_to_today() {
        assert_eq!(to_ymd_at("?", fixed_now()), "2024-06-15");
        assert_eq!(to_ymd_at("1일 전", fixed_now()), "2024-06-14");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  월세  50 \n 관리비 "), "월세 50 관리비");
    }
}
