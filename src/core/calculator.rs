use crate::core::calendar::{SolarCalendar, TERM_NAMES};
use crate::core::ganzhi::Palja;
use crate::core::solar_time;
use crate::domain::model::{
    CalendarRecord, DayInfo, HourPillarResult, RecordInput, RecordMeta, RecordPillars, TimeInput,
    TimezoneInfo,
};
use crate::domain::ports::CalendarOracle;
use crate::utils::error::{PaljaError, Result};
use crate::utils::validation::{validate_range, Validate};
use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

impl Validate for TimeInput {
    fn validate(&self) -> Result<()> {
        validate_range("m", self.month, 1, 12)?;
        if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(PaljaError::InvalidDate {
                year: self.year,
                month: self.month,
                day: self.day,
            });
        }

        match (self.hour, self.minute) {
            (Some(hour), Some(minute)) => {
                validate_range("hh", hour, 0, 23)?;
                validate_range("mm", minute, 0, 59)?;
            }
            (Some(_), None) => {
                return Err(PaljaError::MissingInput {
                    field: "mm".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(PaljaError::MissingInput {
                    field: "hh".to_string(),
                })
            }
            (None, None) => {}
        }

        if let Some(lng) = self.longitude {
            validate_range("lng", lng, -180.0, 180.0)?;
        }
        Ok(())
    }
}

pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| PaljaError::InvalidTimezone {
        tz: name.to_string(),
    })
}

/// Pins a wall-clock time in `tz` to one instant.
///
/// Repeated wall times (DST fall-back) take the earlier instant; skipped
/// ones (DST gap) keep the offset in force before the transition.
pub fn localize(tz: &Tz, naive: chrono::NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
        LocalResult::None => {
            let before = tz.offset_from_utc_datetime(&(naive - Duration::days(1))).fix();
            before.from_local_datetime(&naive).single()
        }
    }
}

/// Everything one birth moment resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub input: TimeInput,
    pub day: DayInfo,
    pub hour: Option<HourPillarResult>,
    pub local_time: Option<DateTime<FixedOffset>>,
}

impl Calculation {
    pub fn palja(&self) -> Palja {
        Palja {
            year: self.day.year,
            month: self.day.month,
            day: self.day.day,
            hour: self.hour.map(|h| h.pillar()),
        }
    }

    pub fn utc_time(&self) -> Option<DateTime<Utc>> {
        self.local_time.map(|dt| dt.with_timezone(&Utc))
    }

    pub fn jieqi_name(&self) -> Option<&'static str> {
        self.day.jieqi.map(|k| TERM_NAMES[k as usize % 24])
    }

    pub fn to_record(&self) -> CalendarRecord {
        let input = &self.input;
        CalendarRecord {
            input: RecordInput {
                y: input.year,
                m: input.month,
                d: input.day,
                hh: input.hour,
                mm: input.minute,
                tz: input.timezone.clone(),
                lng: input.longitude,
            },
            pillars: RecordPillars {
                year: self.day.year,
                month: self.day.month,
                day: self.day.day,
                hour_hint: self.hour.map(Into::into),
            },
            meta: RecordMeta {
                is_jieqi: self.day.has_jieqi(),
                jieqi: self.day.jieqi,
                timezone_info: TimezoneInfo {
                    tz: input.timezone.clone(),
                    utc_time: self.utc_time().map(|dt| dt.to_rfc3339()),
                    local_time: self.local_time.map(|dt| dt.to_rfc3339()),
                },
            },
            fortune: None,
        }
    }
}

/// Date pillars from the calendar oracle plus the solar-time-corrected hour pillar.
pub struct PaljaCalculator<O: CalendarOracle = SolarCalendar> {
    oracle: O,
}

impl Default for PaljaCalculator<SolarCalendar> {
    fn default() -> Self {
        Self::new()
    }
}

impl PaljaCalculator<SolarCalendar> {
    pub fn new() -> Self {
        Self {
            oracle: SolarCalendar::new(),
        }
    }
}

impl<O: CalendarOracle> PaljaCalculator<O> {
    pub fn with_oracle(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn calculate(&self, input: &TimeInput) -> Result<Calculation> {
        // 時區錯誤必須在任何計算之前回報
        let tz = resolve_timezone(&input.timezone)?;
        input.validate()?;

        let (local_time, hour) = match input.clock() {
            Some((hour, minute)) => {
                let naive = NaiveDate::from_ymd_opt(input.year, input.month, input.day)
                    .and_then(|d| d.and_hms_opt(hour, minute, 0))
                    .ok_or(PaljaError::InvalidDate {
                        year: input.year,
                        month: input.month,
                        day: input.day,
                    })?;
                let local = localize(&tz, naive).ok_or_else(|| PaljaError::InvalidInputValue {
                    field: "hh".to_string(),
                    value: format!("{:02}:{:02}", hour, minute),
                    reason: format!("wall time does not exist in {}", input.timezone),
                })?;
                let offset_hours = local.offset().local_minus_utc() as f64 / 3600.0;
                debug!(
                    tz = %input.timezone,
                    offset_hours,
                    local = %local.to_rfc3339(),
                    "Resolved wall time"
                );
                (Some(local), Some((hour, minute, offset_hours)))
            }
            None => (None, None),
        };

        let day = self.oracle.day_info(input.year, input.month, input.day)?;
        let hour = hour.map(|(h, m, offset_hours)| {
            solar_time::hour_pillar(day.day.stem, h, m, offset_hours, input.longitude)
        });

        let calculation = Calculation {
            input: input.clone(),
            day,
            hour,
            local_time,
        };
        info!(
            date = %format!("{:04}-{:02}-{:02}", input.year, input.month, input.day),
            palja = %calculation.palja().compact_ko(),
            jieqi = calculation.jieqi_name().unwrap_or("-"),
            "Pillars calculated"
        );
        Ok(calculation)
    }

    pub fn record(&self, input: &TimeInput) -> Result<CalendarRecord> {
        Ok(self.calculate(input)?.to_record())
    }
}
