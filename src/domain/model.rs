use chrono::NaiveDate;
use crate::utils::error::{PaljaError, Result};
use serde::{Deserialize, Serialize};

/// Heavenly Stem index, 0 (甲) ..= 9 (癸).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stem(u8);

/// Earthly Branch index, 0 (子) ..= 11 (亥).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Branch(u8);

impl Stem {
    pub const COUNT: u8 = 10;

    pub fn new(index: u8) -> Result<Self> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(PaljaError::InvalidInputValue {
                field: "stem".to_string(),
                value: index.to_string(),
                reason: "stem index must be in 0..=9".to_string(),
            })
        }
    }

    /// Wraps any integer onto the 10-cycle.
    pub fn wrapping(n: i64) -> Self {
        Self(n.rem_euclid(Self::COUNT as i64) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl Branch {
    pub const COUNT: u8 = 12;

    pub fn new(index: u8) -> Result<Self> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(PaljaError::InvalidInputValue {
                field: "branch".to_string(),
                value: index.to_string(),
                reason: "branch index must be in 0..=11".to_string(),
            })
        }
    }

    pub fn wrapping(n: i64) -> Self {
        Self(n.rem_euclid(Self::COUNT as i64) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stem {
    type Error = PaljaError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Stem> for u8 {
    fn from(value: Stem) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Branch {
    type Error = PaljaError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Branch> for u8 {
    fn from(value: Branch) -> Self {
        value.0
    }
}

/// A (stem, branch) pair. Serialized the way downstream consumers read it: `{"tg": .., "dz": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SexagenaryPillar {
    #[serde(rename = "tg")]
    pub stem: Stem,
    #[serde(rename = "dz")]
    pub branch: Branch,
}

impl SexagenaryPillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Pillar at position `index` of the 60-cycle (0 = 甲子).
    pub fn from_index60(index: i64) -> Self {
        Self {
            stem: Stem::wrapping(index),
            branch: Branch::wrapping(index),
        }
    }

    /// Position in the 60-cycle. Only pairs of equal parity exist in the cycle.
    pub fn index60(self) -> u8 {
        let s = self.stem.index() as i32;
        let b = self.branch.index() as i32;
        // x ≡ s (mod 10), x ≡ b (mod 12)
        ((6 * s - 5 * b).rem_euclid(60)) as u8
    }

    /// Shifts along the 60-cycle by `steps` (negative moves backwards).
    pub fn shifted(self, steps: i64) -> Self {
        Self {
            stem: Stem::wrapping(self.stem.index() as i64 + steps),
            branch: Branch::wrapping(self.branch.index() as i64 + steps),
        }
    }
}

/// Calendar date plus optional wall-clock time, timezone and longitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub timezone: String,
    pub longitude: Option<f64>,
}

impl TimeInput {
    pub fn date(year: i32, month: u32, day: u32, timezone: impl Into<String>) -> Self {
        Self {
            year,
            month,
            day,
            hour: None,
            minute: None,
            timezone: timezone.into(),
            longitude: None,
        }
    }

    pub fn with_time(mut self, hour: u32, minute: u32) -> Self {
        self.hour = Some(hour);
        self.minute = Some(minute);
        self
    }

    pub fn with_longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self
    }

    /// Clock time when both fields are present.
    pub fn clock(&self) -> Option<(u32, u32)> {
        match (self.hour, self.minute) {
            (Some(h), Some(m)) => Some((h, m)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourPillarResult {
    pub stem: Stem,
    pub branch: Branch,
    pub corrected_hour: u32,
    pub corrected_minute: u32,
}

impl HourPillarResult {
    pub fn pillar(&self) -> SexagenaryPillar {
        SexagenaryPillar::new(self.stem, self.branch)
    }
}

/// What the calendar oracle knows about one civil date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayInfo {
    pub year: SexagenaryPillar,
    pub month: SexagenaryPillar,
    pub day: SexagenaryPillar,
    /// Solar-term index (0 = 冬至) when a term falls on this date.
    pub jieqi: Option<u8>,
}

impl DayInfo {
    pub fn has_jieqi(&self) -> bool {
        self.jieqi.is_some()
    }
}

// ---- JSON record written by the `palja` binary ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRecord {
    pub input: RecordInput,
    pub pillars: RecordPillars,
    pub meta: RecordMeta,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fortune: Option<FortuneFlow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    pub y: i32,
    pub m: u32,
    pub d: u32,
    pub hh: Option<u32>,
    pub mm: Option<u32>,
    pub tz: String,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPillars {
    pub year: SexagenaryPillar,
    pub month: SexagenaryPillar,
    pub day: SexagenaryPillar,
    pub hour_hint: Option<HourHint>,
}

/// Wire form of [`HourPillarResult`]. `dz_index` duplicates `dz` for older readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourHint {
    pub tg: Stem,
    pub dz: Branch,
    pub dz_index: Branch,
    pub actual_hour: u32,
    pub actual_minute: u32,
}

impl From<HourPillarResult> for HourHint {
    fn from(h: HourPillarResult) -> Self {
        Self {
            tg: h.stem,
            dz: h.branch,
            dz_index: h.branch,
            actual_hour: h.corrected_hour,
            actual_minute: h.corrected_minute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(rename = "isJieQi")]
    pub is_jieqi: bool,
    #[serde(rename = "jieQi")]
    pub jieqi: Option<u8>,
    pub timezone_info: TimezoneInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    pub tz: String,
    pub utc_time: Option<String>,
    pub local_time: Option<String>,
}

// ---- luck-pillar flow ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl std::str::FromStr for Sex {
    type Err = PaljaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "남" | "남자" => Ok(Self::Male),
            "f" | "female" | "여" | "여자" => Ok(Self::Female),
            "" | "u" | "unknown" => Ok(Self::Unknown),
            other => Err(PaljaError::InvalidInputValue {
                field: "sex".to_string(),
                value: other.to_string(),
                reason: "expected male/female (M/F)".to_string(),
            }),
        }
    }
}

impl Sex {
    pub fn as_word(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

/// Which luck pillars to add beyond the 대운 list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FortuneRequest {
    /// Date the current periods are picked for; the birth date when absent.
    pub base_date: Option<NaiveDate>,
    pub seun_from: Option<i32>,
    pub seun_to: Option<i32>,
    pub wolun_year: Option<i32>,
    /// 일운 needs both year and month.
    pub ilun_year: Option<i32>,
    pub ilun_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortuneFlow {
    pub sex: Sex,
    pub forward: bool,
    pub base_date: NaiveDate,
    pub current: CurrentFortune,
    pub daeun: Vec<FortunePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub seun: Vec<FortunePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub wolun: Vec<FortunePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ilun: Vec<FortunePeriod>,
}

/// The periods in force on the base date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentFortune {
    pub daeun: FortunePeriod,
    pub seun: FortunePeriod,
    pub wolun: FortunePeriod,
    pub ilun: FortunePeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortunePeriod {
    #[serde(flatten)]
    pub pillar: SexagenaryPillar,
    pub ganji_ko: String,
    pub ganji_hanja: String,
    pub stem_element: String,
    pub stem_yin_yang: String,
    pub stem_ten_god: String,
    pub branch_element: String,
    pub branch_yin_yang: String,
    pub branch_ten_god: String,
    pub branch_twelve: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age_from: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub age_to: Option<u32>,
    pub start_year: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub day: Option<u32>,
}

// ---- LLM exchange ----

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    pub model: String,
    pub prompt: String,
    /// `data:<mime>;base64,...` or a remote URL.
    pub image_url: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmReply {
    pub text: String,
    pub usage: Option<Usage>,
}

// ---- pipeline output ----

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    Json(serde_json::Value),
    Png(Vec<u8>),
}

/// One file a pipeline persists, named `{prefix}_{YYYYMMDD_HHMMSS}.{ext}` on load.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub prefix: String,
    pub payload: ArtifactPayload,
}

impl Artifact {
    pub fn json(prefix: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            prefix: prefix.into(),
            payload: ArtifactPayload::Json(value),
        }
    }

    pub fn png(prefix: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            prefix: prefix.into(),
            payload: ArtifactPayload::Png(bytes),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.payload {
            ArtifactPayload::Json(_) => "json",
            ArtifactPayload::Png(_) => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Printed to stdout once the run finishes.
    pub summary: serde_json::Value,
    pub artifacts: Vec<Artifact>,
}
