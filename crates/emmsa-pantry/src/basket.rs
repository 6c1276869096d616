use chrono::Datelike;

/// Returns the basket name holding prices for `date`: `prices_YYYY_MM_DD`.
///
/// Only the calendar fields are read, so a `NaiveDate`, a `DateTime<Utc>`, or
/// a zoned timestamp all name the basket by the date they carry. Callers pin
/// the date to UTC before calling.
pub fn basket_name<D: Datelike>(date: &D) -> String {
    format!(
        "prices_{:04}_{:02}_{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn basket_name_specific_date() {
        assert_eq!(basket_name(&ymd(2025, 6, 17)), "prices_2025_06_17");
    }

    #[test]
    fn basket_name_zero_pads_month_and_day() {
        assert_eq!(basket_name(&ymd(2023, 12, 1)), "prices_2023_12_01");
        assert_eq!(basket_name(&ymd(2024, 1, 5)), "prices_2024_01_05");
    }

    #[test]
    fn basket_name_end_of_year() {
        assert_eq!(basket_name(&ymd(2023, 12, 31)), "prices_2023_12_31");
    }

    #[test]
    fn basket_name_leap_day() {
        assert_eq!(basket_name(&ymd(2024, 2, 29)), "prices_2024_02_29");
    }

    #[test]
    fn basket_name_from_utc_timestamp_uses_its_calendar_date() {
        let late = Utc.with_ymd_and_hms(2025, 6, 17, 23, 59, 59).unwrap();
        assert_eq!(basket_name(&late), "prices_2025_06_17");
    }

    #[test]
    fn basket_name_always_matches_fixed_shape() {
        let mut date = ymd(2023, 1, 1);
        for _ in 0..800 {
            let name = basket_name(&date);
            let bytes = name.as_bytes();
            assert_eq!(name.len(), "prices_0000_00_00".len(), "{name}");
            assert!(name.starts_with("prices_"), "{name}");
            assert_eq!(bytes[11], b'_', "{name}");
            assert_eq!(bytes[14], b'_', "{name}");
            assert!(
                name[7..]
                    .bytes()
                    .enumerate()
                    .all(|(i, b)| if i == 4 || i == 7 { b == b'_' } else { b.is_ascii_digit() }),
                "{name}"
            );
            date = date.succ_opt().unwrap();
        }
    }
}
