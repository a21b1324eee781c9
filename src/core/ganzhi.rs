//! 천간/지지 vocabulary and the relations derived from a day master.

use crate::domain::model::{Branch, SexagenaryPillar, Stem};
use crate::utils::error::{PaljaError, Result};
use serde::{Deserialize, Serialize};

pub const STEM_KO: [&str; 10] = ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"];
pub const STEM_HANJA: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
pub const BRANCH_KO: [&str; 12] = [
    "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
];
pub const BRANCH_HANJA: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiveElement {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl FiveElement {
    const ORDER: [FiveElement; 5] = [
        FiveElement::Wood,
        FiveElement::Fire,
        FiveElement::Earth,
        FiveElement::Metal,
        FiveElement::Water,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn ko(self) -> &'static str {
        match self {
            Self::Wood => "목",
            Self::Fire => "화",
            Self::Earth => "토",
            Self::Metal => "금",
            Self::Water => "수",
        }
    }
}

// 지지 오행: 자수 축토 인목 묘목 진토 사화 오화 미토 신금 유금 술토 해수
const BRANCH_ELEMENT: [usize; 12] = [4, 2, 0, 0, 2, 1, 1, 2, 3, 3, 2, 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YinYang {
    Yang,
    Yin,
}

impl YinYang {
    fn from_index(index: u8) -> Self {
        if index % 2 == 0 {
            Self::Yang
        } else {
            Self::Yin
        }
    }

    pub fn ko(self) -> &'static str {
        match self {
            Self::Yang => "양",
            Self::Yin => "음",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenGod {
    Bigyeon,
    Geopjae,
    Siksin,
    Sanggwan,
    Pyeonjae,
    Jeongjae,
    Pyeongwan,
    Jeonggwan,
    Pyeonin,
    Jeongin,
}

impl TenGod {
    const TABLE: [TenGod; 10] = [
        TenGod::Bigyeon,
        TenGod::Geopjae,
        TenGod::Siksin,
        TenGod::Sanggwan,
        TenGod::Pyeonjae,
        TenGod::Jeongjae,
        TenGod::Pyeongwan,
        TenGod::Jeonggwan,
        TenGod::Pyeonin,
        TenGod::Jeongin,
    ];

    fn from_relation(element_distance: i32, same_polarity: bool) -> Self {
        let slot = element_distance.rem_euclid(5) as usize * 2 + usize::from(!same_polarity);
        Self::TABLE[slot]
    }

    pub fn ko(self) -> &'static str {
        match self {
            Self::Bigyeon => "비견",
            Self::Geopjae => "겁재",
            Self::Siksin => "식신",
            Self::Sanggwan => "상관",
            Self::Pyeonjae => "편재",
            Self::Jeongjae => "정재",
            Self::Pyeongwan => "편관",
            Self::Jeonggwan => "정관",
            Self::Pyeonin => "편인",
            Self::Jeongin => "정인",
        }
    }
}

const TWELVE_STAGE_KO: [&str; 12] = [
    "장생", "목욕", "관대", "건록", "제왕", "쇠", "병", "사", "묘", "절", "태", "양",
];

// 일간별 장생 지지
const TWELVE_STAGE_START: [i32; 10] = [11, 6, 2, 9, 2, 9, 5, 0, 8, 3];

impl Stem {
    pub fn ko(self) -> &'static str {
        STEM_KO[self.index() as usize]
    }

    pub fn hanja(self) -> &'static str {
        STEM_HANJA[self.index() as usize]
    }

    pub fn element(self) -> FiveElement {
        FiveElement::ORDER[self.index() as usize / 2]
    }

    pub fn yin_yang(self) -> YinYang {
        YinYang::from_index(self.index())
    }

    pub fn from_ko(s: &str) -> Option<Self> {
        STEM_KO
            .iter()
            .position(|k| *k == s)
            .map(|i| Self::wrapping(i as i64))
    }

    pub fn from_hanja(s: &str) -> Option<Self> {
        STEM_HANJA
            .iter()
            .position(|k| *k == s)
            .map(|i| Self::wrapping(i as i64))
    }
}

impl Branch {
    pub fn ko(self) -> &'static str {
        BRANCH_KO[self.index() as usize]
    }

    pub fn hanja(self) -> &'static str {
        BRANCH_HANJA[self.index() as usize]
    }

    pub fn element(self) -> FiveElement {
        FiveElement::ORDER[BRANCH_ELEMENT[self.index() as usize]]
    }

    pub fn yin_yang(self) -> YinYang {
        YinYang::from_index(self.index())
    }

    pub fn from_ko(s: &str) -> Option<Self> {
        BRANCH_KO
            .iter()
            .position(|k| *k == s)
            .map(|i| Self::wrapping(i as i64))
    }

    pub fn from_hanja(s: &str) -> Option<Self> {
        BRANCH_HANJA
            .iter()
            .position(|k| *k == s)
            .map(|i| Self::wrapping(i as i64))
    }
}

pub fn ten_god_of_stem(day_master: Stem, target: Stem) -> TenGod {
    TenGod::from_relation(
        target.element().index() - day_master.element().index(),
        day_master.yin_yang() == target.yin_yang(),
    )
}

pub fn ten_god_of_branch(day_master: Stem, target: Branch) -> TenGod {
    TenGod::from_relation(
        target.element().index() - day_master.element().index(),
        day_master.yin_yang() == target.yin_yang(),
    )
}

/// 십이운성: yang stems walk the branches forward from their 장생, yin stems backward.
pub fn twelve_stage(day_master: Stem, branch: Branch) -> &'static str {
    let start = TWELVE_STAGE_START[day_master.index() as usize];
    let dir = if day_master.index() % 2 == 0 { 1 } else { -1 };
    let step = ((branch.index() as i32 - start) * dir).rem_euclid(12);
    TWELVE_STAGE_KO[step as usize]
}

impl SexagenaryPillar {
    pub fn ko(&self) -> String {
        format!("{}{}", self.stem.ko(), self.branch.ko())
    }

    pub fn hanja(&self) -> String {
        format!("{}{}", self.stem.hanja(), self.branch.hanja())
    }
}

/// Year → month → day (→ hour) pillars of one birth moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palja {
    pub year: SexagenaryPillar,
    pub month: SexagenaryPillar,
    pub day: SexagenaryPillar,
    pub hour: Option<SexagenaryPillar>,
}

impl Palja {
    pub fn pillars(&self) -> Vec<SexagenaryPillar> {
        let mut out = vec![self.year, self.month, self.day];
        out.extend(self.hour);
        out
    }

    pub fn day_master(&self) -> Stem {
        self.day.stem
    }

    /// `경오정해계사정사`
    pub fn compact_ko(&self) -> String {
        self.pillars().iter().map(|p| p.ko()).collect()
    }

    /// `경오 정해 계사 정사`
    pub fn spaced_ko(&self) -> String {
        self.pillars()
            .iter()
            .map(|p| p.ko())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `경오(庚午) 정해(丁亥) ...`
    pub fn with_hanja(&self) -> String {
        self.pillars()
            .iter()
            .map(|p| format!("{}({})", p.ko(), p.hanja()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Stem/branch digits in pillar order (`66311953`).
    pub fn digits(&self) -> String {
        self.pillars()
            .iter()
            .map(|p| format!("{}{}", p.stem.index(), p.branch.index()))
            .collect()
    }

    /// Fixed-order `"YEAR / MONTH / DAY / HOUR"` form; unknown hour is written as `?`.
    pub fn slash_ordered(&self) -> String {
        let hour = self.hour.map(|h| h.ko()).unwrap_or_else(|| "?".to_string());
        format!(
            "{} / {} / {} / {}",
            self.year.ko(),
            self.month.ko(),
            self.day.ko(),
            hour
        )
    }

    /// Ten gods of every character, the day stem itself written as `본원`.
    pub fn ten_gods(&self) -> Vec<&'static str> {
        let dm = self.day_master();
        let mut out = Vec::with_capacity(8);
        for (i, p) in self.pillars().iter().enumerate() {
            if i == 2 {
                out.push("본원");
            } else {
                out.push(ten_god_of_stem(dm, p.stem).ko());
            }
            out.push(ten_god_of_branch(dm, p.branch).ko());
        }
        out
    }

    /// Parses 6 or 8 Korean characters (`경오정해계사` / `경오정해계사정사`), spaces ignored.
    pub fn parse_ko(s: &str) -> Result<Self> {
        let chars: Vec<String> = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string())
            .collect();
        if chars.len() != 6 && chars.len() != 8 {
            return Err(PaljaError::InvalidInputValue {
                field: "palja".to_string(),
                value: s.to_string(),
                reason: "expected 6 or 8 stem/branch characters".to_string(),
            });
        }

        let mut pillars = Vec::with_capacity(4);
        for pair in chars.chunks(2) {
            let stem = Stem::from_ko(&pair[0]).or_else(|| Stem::from_hanja(&pair[0]));
            let branch = Branch::from_ko(&pair[1]).or_else(|| Branch::from_hanja(&pair[1]));
            match (stem, branch) {
                (Some(stem), Some(branch)) if stem.index() % 2 == branch.index() % 2 => {
                    pillars.push(SexagenaryPillar::new(stem, branch))
                }
                _ => {
                    return Err(PaljaError::InvalidInputValue {
                        field: "palja".to_string(),
                        value: s.to_string(),
                        reason: format!("'{}{}' is not a sexagenary pair", pair[0], pair[1]),
                    })
                }
            }
        }

        Ok(Self {
            year: pillars[0],
            month: pillars[1],
            day: pillars[2],
            hour: pillars.get(3).copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar(stem: u8, branch: u8) -> SexagenaryPillar {
        SexagenaryPillar::new(Stem::new(stem).unwrap(), Branch::new(branch).unwrap())
    }

    fn sample() -> Palja {
        // 1990-11-24 10:30 KST
        Palja {
            year: pillar(6, 6),
            month: pillar(3, 11),
            day: pillar(9, 5),
            hour: Some(pillar(3, 5)),
        }
    }

    #[test]
    fn test_palja_renderings() {
        let p = sample();
        assert_eq!(p.compact_ko(), "경오정해계사정사");
        assert_eq!(p.spaced_ko(), "경오 정해 계사 정사");
        assert_eq!(p.with_hanja(), "경오(庚午) 정해(丁亥) 계사(癸巳) 정사(丁巳)");
        assert_eq!(p.digits(), "66311953");
        assert_eq!(p.slash_ordered(), "경오 / 정해 / 계사 / 정사");
    }

    #[test]
    fn test_palja_parse() {
        let parsed = Palja::parse_ko("경오정해계사정사").unwrap();
        assert_eq!(parsed, sample());

        let parsed = Palja::parse_ko("庚午 丁亥 癸巳").unwrap();
        assert_eq!(parsed.hour, None);
        assert_eq!(parsed.day, pillar(9, 5));

        assert!(Palja::parse_ko("경오정해계").is_err());
        // 갑축 is not in the 60-cycle
        assert!(Palja::parse_ko("갑축정해계사").is_err());
    }

    #[test]
    fn test_ten_gods() {
        let dm = Stem::new(9).unwrap(); // 계수
        assert_eq!(ten_god_of_stem(dm, Stem::new(9).unwrap()), TenGod::Bigyeon);
        assert_eq!(ten_god_of_stem(dm, Stem::new(8).unwrap()), TenGod::Geopjae);
        assert_eq!(ten_god_of_stem(dm, Stem::new(0).unwrap()), TenGod::Sanggwan);
        assert_eq!(ten_god_of_stem(dm, Stem::new(3).unwrap()), TenGod::Pyeonjae);
        assert_eq!(ten_god_of_stem(dm, Stem::new(6).unwrap()), TenGod::Jeongin);
        assert_eq!(ten_god_of_branch(dm, Branch::new(5).unwrap()), TenGod::Pyeonjae);
        assert_eq!(ten_god_of_branch(dm, Branch::new(6).unwrap()), TenGod::Jeongjae);

        let gods = sample().ten_gods();
        assert_eq!(gods.len(), 8);
        assert_eq!(gods[4], "본원");
        assert_eq!(gods[0], "정인");
    }

    #[test]
    fn test_twelve_stage() {
        // 갑목 장생 at 해, 제왕 at 묘
        let gap = Stem::new(0).unwrap();
        assert_eq!(twelve_stage(gap, Branch::new(11).unwrap()), "장생");
        assert_eq!(twelve_stage(gap, Branch::new(3).unwrap()), "제왕");
        // 을목 runs backwards from 오
        let eul = Stem::new(1).unwrap();
        assert_eq!(twelve_stage(eul, Branch::new(6).unwrap()), "장생");
        assert_eq!(twelve_stage(eul, Branch::new(5).unwrap()), "목욕");
    }

    #[test]
    fn test_elements() {
        assert_eq!(Stem::new(2).unwrap().element(), FiveElement::Fire);
        assert_eq!(Branch::new(0).unwrap().element(), FiveElement::Water);
        assert_eq!(Branch::new(7).unwrap().element().ko(), "토");
        assert_eq!(Stem::new(3).unwrap().yin_yang().ko(), "음");
    }
}
