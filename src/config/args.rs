use crate::domain::model::{FortuneRequest, Sex, TimeInput};
use crate::utils::error::{PaljaError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_range, Validate,
};
use chrono::NaiveDate;
use clap::Parser;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

fn parse_sex(s: &str) -> std::result::Result<Sex, String> {
    s.parse::<Sex>().map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Parser)]
#[command(name = "palja")]
#[command(about = "Four pillars (year/month/day/hour) for a solar date, as JSON")]
pub struct CalcArgs {
    #[arg(long)]
    pub y: i32,

    #[arg(long)]
    pub m: u32,

    #[arg(long)]
    pub d: u32,

    /// Clock hour (0-23); requires --mm
    #[arg(long)]
    pub hh: Option<u32>,

    /// Clock minute (0-59); requires --hh
    #[arg(long)]
    pub mm: Option<u32>,

    /// IANA timezone, e.g. Asia/Seoul
    #[arg(long, default_value = "UTC")]
    pub tz: String,

    /// Longitude in decimal degrees for solar-time correction
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Attach 대운/세운/월운/일운 luck pillars
    #[arg(long)]
    pub fortune: bool,

    #[arg(long, value_parser = parse_sex, default_value = "unknown")]
    pub sex: Sex,

    #[arg(long, requires = "fortune")]
    pub seun_from: Option<i32>,

    #[arg(long, requires = "fortune")]
    pub seun_to: Option<i32>,

    /// Date (YYYY-MM-DD) the current periods are picked for; defaults to the birth date
    #[arg(long, requires = "fortune")]
    pub base_date: Option<NaiveDate>,

    /// List the 12 월운 of this year
    #[arg(long, requires = "fortune")]
    pub wolun_year: Option<i32>,

    /// List the 일운 of one month; needs --ilun-month
    #[arg(long, requires = "fortune")]
    pub ilun_year: Option<i32>,

    /// Month (1-12) for --ilun-year
    #[arg(long, requires = "fortune")]
    pub ilun_month: Option<u32>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CalcArgs {
    pub fn time_input(&self) -> TimeInput {
        TimeInput {
            year: self.y,
            month: self.m,
            day: self.d,
            hour: self.hh,
            minute: self.mm,
            timezone: self.tz.clone(),
            longitude: self.lng,
        }
    }

    pub fn fortune_request(&self) -> FortuneRequest {
        FortuneRequest {
            base_date: self.base_date,
            seun_from: self.seun_from,
            seun_to: self.seun_to,
            wolun_year: self.wolun_year,
            ilun_year: self.ilun_year,
            ilun_month: self.ilun_month,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "saju_interpret")]
#[command(about = "Saju personality interpretation through a language model")]
pub struct SajuArgs {
    #[arg(long, value_parser = parse_sex)]
    pub sex: Sex,

    /// YYYYMMDD or YYYYMMDDHHMM
    #[arg(long)]
    pub birth: Option<String>,

    /// Eight characters in Korean, e.g. 경오정해계사정사
    #[arg(long)]
    pub palja: Option<String>,

    #[arg(long, default_value = "Asia/Seoul")]
    pub tz: String,

    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override output directory from config
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override text model from config
    #[arg(long)]
    pub model: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,

    /// JSON log lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl Validate for SajuArgs {
    fn validate(&self) -> Result<()> {
        if self.birth.is_none() && self.palja.is_none() {
            return Err(PaljaError::MissingInput {
                field: "birth".to_string(),
            });
        }
        if let Some(lng) = self.lng {
            validate_range("lng", lng, -180.0, 180.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "face_reading")]
#[command(about = "Physiognomy reading from a face photo through a language model")]
pub struct FaceArgs {
    /// Face photo (jpg, jpeg, png, webp)
    #[arg(long)]
    pub image: String,

    #[arg(long, value_parser = parse_sex)]
    pub sex: Sex,

    #[arg(long)]
    pub age: u32,

    /// Also generate an ideal-partner portrait
    #[arg(long)]
    pub partner_image: bool,

    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long)]
    pub output: Option<String>,

    /// Override vision model from config
    #[arg(long)]
    pub vision_model: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub log_json: bool,
}

impl Validate for FaceArgs {
    fn validate(&self) -> Result<()> {
        validate_path("image", &self.image)?;
        validate_file_extensions("image", std::slice::from_ref(&self.image), &IMAGE_EXTENSIONS)?;
        validate_range("age", self.age, 1, 120)?;
        Ok(())
    }
}
