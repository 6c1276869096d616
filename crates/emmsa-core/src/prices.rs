//! Price records scraped from the EMMSA daily price table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the provider's daily price table.
///
/// Field names on the wire follow the layout already stored in existing
/// baskets (`variedad`, `precio_min`, ...). Prices serialize as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub product: String,
    #[serde(rename = "variedad")]
    pub variety: String,
    #[serde(rename = "precio_min", with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
    #[serde(rename = "precio_max", with = "rust_decimal::serde::float")]
    pub max_price: Decimal,
    #[serde(rename = "precio_prom", with = "rust_decimal::serde::float")]
    pub avg_price: Decimal,
}

/// All records fetched for one trading date, stamped with the fetch time.
///
/// This is the unit written to a basket and to the CLI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBatch {
    pub date: NaiveDate,
    pub prices: Vec<PriceRecord>,
    pub fetched: DateTime<Utc>,
}

impl PriceBatch {
    #[must_use]
    pub fn new(date: NaiveDate, prices: Vec<PriceRecord>, fetched: DateTime<Utc>) -> Self {
        Self {
            date,
            prices,
            fetched,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn sample_record() -> PriceRecord {
        PriceRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 17).unwrap(),
            product: "PAPA".to_string(),
            variety: "AMARILLA".to_string(),
            min_price: Decimal::new(250, 2),
            max_price: Decimal::new(300, 2),
            avg_price: Decimal::new(275, 2),
        }
    }

    #[test]
    fn price_record_serializes_with_basket_field_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(value["date"], "2025-06-17");
        assert_eq!(value["product"], "PAPA");
        assert_eq!(value["variedad"], "AMARILLA");
        assert_eq!(value["precio_min"], 2.5);
        assert_eq!(value["precio_max"], 3.0);
        assert_eq!(value["precio_prom"], 2.75);
    }

    #[test]
    fn price_record_deserializes_numeric_prices() {
        let json = r#"{
            "date": "2025-06-17",
            "product": "PAPA",
            "variedad": "AMARILLA",
            "precio_min": 2.5,
            "precio_max": 3,
            "precio_prom": 2.75
        }"#;
        let record: PriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, sample_record());
    }

    #[test]
    fn price_batch_serializes_date_prices_and_fetched() {
        let fetched = Utc.with_ymd_and_hms(2025, 6, 17, 12, 30, 0).unwrap();
        let batch = PriceBatch::new(
            NaiveDate::from_ymd_opt(2025, 6, 17).unwrap(),
            vec![sample_record()],
            fetched,
        );
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["date"], "2025-06-17");
        assert_eq!(value["prices"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["fetched"], "2025-06-17T12:30:00Z");
    }

    #[test]
    fn empty_batch_reports_empty() {
        let batch = PriceBatch::new(
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            Vec::new(),
            Utc::now(),
        );
        assert!(batch.is_empty());
    }
}
