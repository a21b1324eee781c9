use crate::core::ganzhi::{self, Palja};
use crate::domain::model::{
    CurrentFortune, FortuneFlow, FortunePeriod, FortuneRequest, SexagenaryPillar, Sex, Stem,
};
use crate::domain::ports::CalendarOracle;
use crate::utils::error::{PaljaError, Result};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

pub const DAEUN_PERIODS: u32 = 8;
pub const MAX_SEUN_YEARS: i32 = 30;

/// Birth facts the luck-pillar flow starts from.
#[derive(Debug, Clone)]
pub struct BirthChart {
    pub palja: Palja,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub sex: Sex,
}

impl BirthChart {
    pub fn birth_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(PaljaError::InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
        })
    }
}

/// 陽年男 / 陰年女 順行, otherwise 逆行. Unknown sex follows the male rule.
pub fn is_forward(year_stem: Stem, sex: Sex) -> bool {
    let yang_year = year_stem.index() % 2 == 0;
    match sex {
        Sex::Female => !yang_year,
        Sex::Male | Sex::Unknown => yang_year,
    }
}

fn period(pillar: SexagenaryPillar, day_master: Stem, start_year: i32) -> FortunePeriod {
    FortunePeriod {
        pillar,
        ganji_ko: pillar.ko(),
        ganji_hanja: pillar.hanja(),
        stem_element: pillar.stem.element().ko().to_string(),
        stem_yin_yang: pillar.stem.yin_yang().ko().to_string(),
        stem_ten_god: ganzhi::ten_god_of_stem(day_master, pillar.stem).ko().to_string(),
        branch_element: pillar.branch.element().ko().to_string(),
        branch_yin_yang: pillar.branch.yin_yang().ko().to_string(),
        branch_ten_god: ganzhi::ten_god_of_branch(day_master, pillar.branch).ko().to_string(),
        branch_twelve: ganzhi::twelve_stage(day_master, pillar.branch).to_string(),
        order: None,
        age_from: None,
        age_to: None,
        start_year,
        month: None,
        day: None,
    }
}

/// 대운: month pillar shifted one step per decade.
pub fn daeun(chart: &BirthChart) -> Vec<FortunePeriod> {
    let forward = is_forward(chart.palja.year.stem, chart.sex);
    let day_master = chart.palja.day_master();

    (1..=DAEUN_PERIODS)
        .map(|order| {
            let shift = if forward { order as i64 } else { -(order as i64) };
            let age_from = 1 + (order - 1) * 10;
            let mut item = period(
                chart.palja.month.shifted(shift),
                day_master,
                chart.year + age_from as i32,
            );
            item.order = Some(order);
            item.age_from = Some(age_from);
            item.age_to = Some(age_from + 9);
            item
        })
        .collect()
}

/// The 대운 whose decade holds `base_year`, counting the birth year as age 1.
/// Ages past the last period stay on the last one.
pub fn current_daeun(
    list: &[FortunePeriod],
    birth_year: i32,
    base_year: i32,
) -> Option<FortunePeriod> {
    let age = (base_year - birth_year + 1).max(1) as usize;
    let idx = ((age - 1) / 10).min(list.len().checked_sub(1)?);
    list.get(idx).cloned()
}

fn clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

fn anchored_day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    clamped_day(year, month, day).ok_or(PaljaError::InvalidDate { year, month, day })
}

fn positive_year(field: &str, year: i32) -> Result<()> {
    if year <= 0 {
        return Err(PaljaError::InvalidInputValue {
            field: field.to_string(),
            value: year.to_string(),
            reason: "year must be positive".to_string(),
        });
    }
    Ok(())
}

/// 세운: year pillar of each year in range, taken at the base month/day.
pub fn seun<O: CalendarOracle>(
    oracle: &O,
    chart: &BirthChart,
    base: NaiveDate,
    from: i32,
    to: i32,
) -> Result<Vec<FortunePeriod>> {
    if from <= 0 || to <= 0 {
        return Err(PaljaError::InvalidInputValue {
            field: "seun".to_string(),
            value: format!("{}..{}", from, to),
            reason: "years must be positive".to_string(),
        });
    }

    let (from, mut to) = if from > to { (to, from) } else { (from, to) };
    if to - from + 1 > MAX_SEUN_YEARS {
        to = from + MAX_SEUN_YEARS - 1;
    }

    let day_master = chart.palja.day_master();
    let mut out = Vec::with_capacity((to - from + 1) as usize);
    for year in from..=to {
        let date = anchored_day(year, base.month(), base.day())?;
        let info = oracle.day_info(year, date.month(), date.day())?;
        out.push(period(info.year, day_master, year));
    }
    debug!(from, to, count = out.len(), "Seun computed");
    Ok(out)
}

/// 월운: the month pillar in force on the base day of each calendar month of `year`.
pub fn wolun<O: CalendarOracle>(
    oracle: &O,
    chart: &BirthChart,
    base: NaiveDate,
    year: i32,
) -> Result<Vec<FortunePeriod>> {
    positive_year("wolun_year", year)?;

    let day_master = chart.palja.day_master();
    let mut out = Vec::with_capacity(12);
    for month in 1..=12u32 {
        let date = anchored_day(year, month, base.day())?;
        let info = oracle.day_info(year, month, date.day())?;
        let mut item = period(info.month, day_master, year);
        item.month = Some(month);
        out.push(item);
    }
    debug!(year, "Wolun computed");
    Ok(out)
}

/// 일운: day pillar of every day in `year`-`month`.
pub fn ilun<O: CalendarOracle>(
    oracle: &O,
    chart: &BirthChart,
    year: i32,
    month: u32,
) -> Result<Vec<FortunePeriod>> {
    positive_year("ilun_year", year)?;
    if !(1..=12).contains(&month) {
        return Err(PaljaError::InvalidInputValue {
            field: "ilun_month".to_string(),
            value: month.to_string(),
            reason: "month must be in 1..=12".to_string(),
        });
    }

    let day_master = chart.palja.day_master();
    let mut out = Vec::with_capacity(31);
    for day in (1..=31u32).take_while(|d| NaiveDate::from_ymd_opt(year, month, *d).is_some()) {
        let info = oracle.day_info(year, month, day)?;
        let mut item = period(info.day, day_master, year);
        item.month = Some(month);
        item.day = Some(day);
        out.push(item);
    }
    debug!(year, month, count = out.len(), "Ilun computed");
    Ok(out)
}

fn current<O: CalendarOracle>(
    oracle: &O,
    chart: &BirthChart,
    daeun_list: &[FortunePeriod],
    base: NaiveDate,
) -> Result<CurrentFortune> {
    let day_master = chart.palja.day_master();
    let info = oracle.day_info(base.year(), base.month(), base.day())?;

    let daeun = current_daeun(daeun_list, chart.year, base.year()).ok_or_else(|| {
        PaljaError::MissingInput {
            field: "daeun".to_string(),
        }
    })?;
    let seun = period(info.year, day_master, base.year());
    let mut wolun = period(info.month, day_master, base.year());
    wolun.month = Some(base.month());
    let mut ilun = period(info.day, day_master, base.year());
    ilun.month = Some(base.month());
    ilun.day = Some(base.day());

    Ok(CurrentFortune {
        daeun,
        seun,
        wolun,
        ilun,
    })
}

/// Daeun always with the periods current on the base date; seun when at
/// least one bound is given (a missing bound is the base year), wolun for
/// `wolun_year`, ilun for the `ilun_year`/`ilun_month` pair.
pub fn fortune_flow<O: CalendarOracle>(
    oracle: &O,
    chart: &BirthChart,
    request: &FortuneRequest,
) -> Result<FortuneFlow> {
    let base = match request.base_date {
        Some(date) => date,
        None => chart.birth_date()?,
    };

    let daeun = daeun(chart);
    let current = current(oracle, chart, &daeun, base)?;

    let seun = match (request.seun_from, request.seun_to) {
        (None, None) => Vec::new(),
        (from, to) => seun(
            oracle,
            chart,
            base,
            from.unwrap_or(base.year()),
            to.unwrap_or(base.year()),
        )?,
    };

    let wolun = match request.wolun_year {
        Some(year) => wolun(oracle, chart, base, year)?,
        None => Vec::new(),
    };

    // 일운 年月要成對
    let ilun = match (request.ilun_year, request.ilun_month) {
        (None, None) => Vec::new(),
        (Some(year), Some(month)) => ilun(oracle, chart, year, month)?,
        (Some(_), None) => {
            return Err(PaljaError::MissingInput {
                field: "ilun_month".to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(PaljaError::MissingInput {
                field: "ilun_year".to_string(),
            })
        }
    };

    Ok(FortuneFlow {
        sex: chart.sex,
        forward: is_forward(chart.palja.year.stem, chart.sex),
        base_date: base,
        current,
        daeun,
        seun,
        wolun,
        ilun,
    })
}
