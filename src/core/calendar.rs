use crate::core::astro;
use crate::domain::model::{Branch, DayInfo, SexagenaryPillar, Stem};
use crate::domain::ports::CalendarOracle;
use crate::utils::error::{PaljaError, Result};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// 立春
pub const LICHUN: u8 = 3;

pub const TERM_NAMES: [&str; 24] = [
    "冬至", "小寒", "大寒", "立春", "雨水", "驚蟄", "春分", "清明", "穀雨", "立夏", "小滿", "芒種",
    "夏至", "小暑", "大暑", "立秋", "處暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪",
];

// 五虎遁：年干 → 寅月天干
const TIGER_MONTH_STEM: [i64; 5] = [2, 4, 6, 8, 0];

// JDN 與 60 甲子的相位差
const DAY_CYCLE_OFFSET: i64 = 49;
const JDN_OF_CE_DAY_ZERO: i64 = 1_721_425;

/// Solar calendar oracle.
///
/// Terms fall on the civil dates the almanac tables give in UTC+8;
/// pillars change on the whole date containing a term.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalendar;

impl SolarCalendar {
    pub fn new() -> Self {
        Self
    }

    /// Civil date on which solar term `k` falls in `year`.
    pub fn term_date(&self, year: i32, k: u8) -> Result<NaiveDate> {
        let k = k % 24;
        astro::term_date(year, k).ok_or(PaljaError::TermOutOfRange {
            year,
            term: TERM_NAMES[k as usize],
        })
    }

    fn term_on(&self, date: NaiveDate) -> Result<Option<u8>> {
        for k in 0..24u8 {
            if self.term_date(date.year(), k)? == date {
                return Ok(Some(k));
            }
        }
        Ok(None)
    }

    pub fn year_pillar(&self, date: NaiveDate) -> Result<SexagenaryPillar> {
        let lichun = self.term_date(date.year(), LICHUN)?;
        let cycle_year = if date >= lichun {
            date.year()
        } else {
            date.year() - 1
        };
        Ok(SexagenaryPillar::from_index60(cycle_year as i64 - 4))
    }

    pub fn month_pillar(&self, date: NaiveDate, year_stem: Stem) -> Result<SexagenaryPillar> {
        // 小寒之前仍屬上一年大雪開啟的子月
        let mut branch = 0i64;
        for k in (1..24u8).step_by(2) {
            if self.term_date(date.year(), k)? <= date {
                branch = ((k as i64 + 1) / 2) % 12;
            }
        }

        let seed = TIGER_MONTH_STEM[year_stem.index() as usize % 5];
        let stem = seed + (branch - 2).rem_euclid(12);
        Ok(SexagenaryPillar::new(Stem::wrapping(stem), Branch::wrapping(branch)))
    }
}

/// Day pillar straight from the Julian Day Number.
pub fn day_pillar(date: NaiveDate) -> SexagenaryPillar {
    let jdn = date.num_days_from_ce() as i64 + JDN_OF_CE_DAY_ZERO;
    SexagenaryPillar::from_index60(jdn + DAY_CYCLE_OFFSET)
}

impl CalendarOracle for SolarCalendar {
    fn day_info(&self, year: i32, month: u32, day: u32) -> Result<DayInfo> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(PaljaError::InvalidDate { year, month, day })?;

        let year_pillar = self.year_pillar(date)?;
        let month_pillar = self.month_pillar(date, year_pillar.stem)?;
        let jieqi = self.term_on(date)?;
        if let Some(k) = jieqi {
            if let Some(at) = astro::term_instant(year, k) {
                debug!(term = TERM_NAMES[k as usize], at = %at, "Solar term instant (UTC+8)");
            }
        }

        debug!(
            date = %date,
            year = year_pillar.index60(),
            month = month_pillar.index60(),
            jieqi = ?jieqi,
            "Calendar day resolved"
        );

        Ok(DayInfo {
            year: year_pillar,
            month: month_pillar,
            day: day_pillar(date),
            jieqi,
        })
    }
}
