//! Solar-term instants from the 寿星 (sxwnl) series, as packaged by `tyme4rs`.
//!
//! Term dates are the table-corrected civil days almanacs print, in Beijing
//! time (UTC+8). Exact instants are on the same time scale, to the second.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::ops::RangeInclusive;
use tyme4rs::tyme::jd::J2000;
use tyme4rs::tyme::solar::SolarTerm;

pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Years the term series is defined for.
pub const TERM_YEARS: RangeInclusive<i32> = 1..=9999;

/// Term `k` of Gregorian `year`; `k = 0` is the 冬至 in December of that year.
fn term(year: i32, k: u8) -> Option<SolarTerm> {
    if !TERM_YEARS.contains(&year) {
        return None;
    }
    let k = k % 24;
    // tyme4rs 的第 0 個節氣是前一年十二月的冬至
    let tyme_year = if k == 0 { year + 1 } else { year };
    Some(SolarTerm::from_index(tyme_year as isize, k as isize))
}

/// Civil date (UTC+8) on which term `k` of `year` falls.
pub fn term_date(year: i32, k: u8) -> Option<NaiveDate> {
    // 曆用儒略日落在當天正午，換算走公曆外推
    let jd = term(year, k)?.get_cursory_julian_day() + J2000;
    jd_to_naive(jd).map(|dt| dt.date())
}

/// Exact instant of term `k` of `year`, as UTC+8 wall time.
pub fn term_instant(year: i32, k: u8) -> Option<NaiveDateTime> {
    jd_to_naive(term(year, k)?.get_julian_day().get_day())
}

/// Date-time of a Julian Day on its own time scale, rounded to the second.
pub fn jd_to_naive(jd: f64) -> Option<NaiveDateTime> {
    let secs = ((jd - JD_UNIX_EPOCH) * 86_400.0).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_jd_to_naive_reference_points() {
        let noon = jd_to_naive(J2000).unwrap();
        assert_eq!(noon, ymd(2000, 1, 1).and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(
            jd_to_naive(JD_UNIX_EPOCH).unwrap(),
            ymd(1970, 1, 1).and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_lichun_2024() {
        // 立春 2024-02-04 16:26:53 (UTC+8)
        let at = term_instant(2024, 3).unwrap();
        assert_eq!(at.date(), ymd(2024, 2, 4));
        assert_eq!(at.hour(), 16);
        assert!((26..=27).contains(&at.minute()));
        assert_eq!(term_date(2024, 3), Some(ymd(2024, 2, 4)));
    }

    #[test]
    fn test_terms_just_after_midnight() {
        // 驚蟄 2014-03-06 00:02, 小暑 2016-07-07 00:03 (UTC+8)
        assert_eq!(term_date(2014, 5), Some(ymd(2014, 3, 6)));
        let at = term_instant(2014, 5).unwrap();
        assert_eq!((at.date(), at.hour()), (ymd(2014, 3, 6), 0));

        assert_eq!(term_date(2016, 13), Some(ymd(2016, 7, 7)));
        let at = term_instant(2016, 13).unwrap();
        assert_eq!((at.date(), at.hour()), (ymd(2016, 7, 7), 0));
    }

    #[test]
    fn test_years_outside_series() {
        assert_eq!(term_date(0, 3), None);
        assert_eq!(term_date(10_000, 3), None);
        assert_eq!(term_instant(-5, 5), None);
        assert!(term_date(9999, 23).is_some());
    }

    #[test]
    fn test_every_term_lands_in_its_year() {
        for year in [1900, 1950, 1990, 2024, 2100] {
            let mut prev = None;
            for k in 1..24u8 {
                let date = term_date(year, k).unwrap();
                assert_eq!(date.year(), year);
                if let Some(p) = prev {
                    assert!(date > p, "term {} of {} out of order", k, year);
                }
                prev = Some(date);
            }
            let dongzhi = term_date(year, 0).unwrap();
            assert_eq!(dongzhi.month(), 12);
            assert!(dongzhi.day() >= 21 && dongzhi.day() <= 23);
        }
    }
}
