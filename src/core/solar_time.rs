use crate::domain::model::{Branch, HourPillarResult, Stem};

const MINUTES_PER_DAY: f64 = 1440.0;
/// 360° / 24h
const MINUTES_PER_DEGREE: f64 = 4.0;
const DEGREES_PER_HOUR: f64 = 15.0;

/// Shifts clock time to local mean solar time.
///
/// The standard meridian comes from the instant's UTC offset, DST included,
/// so summer times are corrected against a meridian 15° east of the zone's
/// nominal one. Without a longitude the clock time is returned unchanged.
pub fn correct_solar_time(
    hour: u32,
    minute: u32,
    utc_offset_hours: f64,
    longitude: Option<f64>,
) -> (u32, u32) {
    let Some(lng) = longitude else {
        return (hour, minute);
    };

    let offset_minutes = (lng - utc_offset_hours * DEGREES_PER_HOUR) * MINUTES_PER_DEGREE;
    let mut total =
        (hour as f64 * 60.0 + minute as f64 + offset_minutes).rem_euclid(MINUTES_PER_DAY);
    // rem_euclid 在極小負值時可能回傳 1440.0
    if total >= MINUTES_PER_DAY {
        total = 0.0;
    }

    let corrected_hour = (total / 60.0).floor() as u32 % 24;
    let corrected_minute = (total % 60.0).floor() as u32;
    (corrected_hour, corrected_minute.min(59))
}

/// 23:00–01:00 is 子 (0), 01:00–03:00 is 丑 (1), ... 21:00–23:00 is 亥 (11).
pub fn hour_branch(hour: u32) -> Branch {
    Branch::wrapping(((hour as i64 + 1) / 2) % 12)
}

/// 五鼠遁: hour stem from the day stem and hour branch.
pub fn hour_stem(day_stem: Stem, branch: Branch) -> Stem {
    Stem::wrapping(day_stem.index() as i64 * 2 + branch.index() as i64)
}

pub fn hour_pillar(
    day_stem: Stem,
    hour: u32,
    minute: u32,
    utc_offset_hours: f64,
    longitude: Option<f64>,
) -> HourPillarResult {
    let (corrected_hour, corrected_minute) =
        correct_solar_time(hour, minute, utc_offset_hours, longitude);
    let branch = hour_branch(corrected_hour);
    HourPillarResult {
        stem: hour_stem(day_stem, branch),
        branch,
        corrected_hour,
        corrected_minute,
    }
}
