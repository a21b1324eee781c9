use super::{save_artifacts, INTERPRETATION_TEMPERATURE};
use crate::core::calculator::PaljaCalculator;
use crate::core::ganzhi::Palja;
use crate::core::llm_json::parse_llm_json;
use crate::core::prompts::saju_prompt;
use crate::domain::model::{AnalysisResult, Artifact, Sex, TextRequest, TimeInput};
use crate::domain::ports::{LlmClient, Pipeline, Storage};
use crate::utils::error::{PaljaError, Result};
use serde_json::Value;
use tracing::{debug, info};

/// Birth data for one interpretation. At least one of `birth` / `palja` is required.
#[derive(Debug, Clone)]
pub struct SajuRequest {
    pub sex: Sex,
    /// `YYYYMMDD` or `YYYYMMDDHHMM`
    pub birth: Option<String>,
    pub palja: Option<String>,
    pub timezone: String,
    pub longitude: Option<f64>,
}

/// `YYYYMMDD[HHMM]` → calculator input in `timezone`.
pub fn parse_birth(birth: &str, timezone: &str, longitude: Option<f64>) -> Result<TimeInput> {
    let birth = birth.trim();
    let invalid = |reason: &str| PaljaError::InvalidInputValue {
        field: "birth".to_string(),
        value: birth.to_string(),
        reason: reason.to_string(),
    };

    if !birth.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("digits only, YYYYMMDD or YYYYMMDDHHMM"));
    }
    let num = |range: std::ops::Range<usize>| -> Result<u32> {
        birth[range]
            .parse::<u32>()
            .map_err(|_| invalid("digits only, YYYYMMDD or YYYYMMDDHHMM"))
    };

    let mut input = match birth.len() {
        8 | 12 => TimeInput::date(num(0..4)? as i32, num(4..6)?, num(6..8)?, timezone),
        _ => return Err(invalid("expected 8 or 12 digits")),
    };
    if birth.len() == 12 {
        input = input.with_time(num(8..10)?, num(10..12)?);
    }
    input.longitude = longitude;
    Ok(input)
}

/// The pillars handed to the model, plus the birth string they came from.
#[derive(Debug, Clone)]
pub struct SajuSubject {
    pub palja: Palja,
    pub birth: Option<String>,
}

pub struct SajuPipeline<S: Storage, L: LlmClient> {
    storage: S,
    llm: L,
    model: String,
    request: SajuRequest,
    calculator: PaljaCalculator,
}

impl<S: Storage, L: LlmClient> SajuPipeline<S, L> {
    pub fn new(storage: S, llm: L, model: impl Into<String>, request: SajuRequest) -> Self {
        Self {
            storage,
            llm,
            model: model.into(),
            request,
            calculator: PaljaCalculator::new(),
        }
    }

    fn file_prefix(&self, subject: &SajuSubject) -> String {
        format!(
            "saju_interpretation_{}_{}_{}",
            self.request.sex.as_word(),
            subject.birth.as_deref().unwrap_or("unknown"),
            subject.palja.compact_ko()
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, L: LlmClient> Pipeline for SajuPipeline<S, L> {
    type Extracted = SajuSubject;

    async fn extract(&self) -> Result<SajuSubject> {
        let birth = self
            .request
            .birth
            .as_ref()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        // 有八字就直接用，生日只作為年齡背景
        let palja = match (&self.request.palja, &birth) {
            (Some(text), _) => Palja::parse_ko(text)?,
            (None, Some(birth)) => {
                let input = parse_birth(birth, &self.request.timezone, self.request.longitude)?;
                self.calculator.calculate(&input)?.palja()
            }
            (None, None) => {
                return Err(PaljaError::MissingInput {
                    field: "birth".to_string(),
                })
            }
        };

        info!(palja = %palja.spaced_ko(), "Palja ready");
        Ok(SajuSubject { palja, birth })
    }

    async fn transform(&self, subject: SajuSubject) -> Result<AnalysisResult> {
        let prompt = saju_prompt(self.request.sex, subject.birth.as_deref(), &subject.palja);
        debug!(chars = prompt.chars().count(), "Saju prompt built");

        let reply = self
            .llm
            .complete_text(TextRequest {
                model: self.model.clone(),
                prompt,
                temperature: INTERPRETATION_TEMPERATURE,
            })
            .await?;
        let interpretation = Value::Object(parse_llm_json(&reply.text)?);

        Ok(AnalysisResult {
            summary: interpretation.clone(),
            artifacts: vec![Artifact::json(self.file_prefix(&subject), interpretation)],
        })
    }

    async fn load(&self, result: AnalysisResult) -> Result<Vec<String>> {
        save_artifacts(&self.storage, &result.artifacts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::{Call, MockStorage, ScriptedLlm};

    fn request(birth: Option<&str>, palja: Option<&str>) -> SajuRequest {
        SajuRequest {
            sex: Sex::Male,
            birth: birth.map(str::to_string),
            palja: palja.map(str::to_string),
            timezone: "Asia/Seoul".to_string(),
            longitude: None,
        }
    }

    #[test]
    fn test_parse_birth() {
        let input = parse_birth("199011241030", "Asia/Seoul", None).unwrap();
        assert_eq!((input.year, input.month, input.day), (1990, 11, 24));
        assert_eq!(input.clock(), Some((10, 30)));

        let input = parse_birth("20000101", "UTC", Some(127.0)).unwrap();
        assert_eq!(input.clock(), None);
        assert_eq!(input.longitude, Some(127.0));

        assert!(parse_birth("1990112", "UTC", None).is_err());
        assert!(parse_birth("1990-11-24", "UTC", None).is_err());
    }

    #[tokio::test]
    async fn test_extract_derives_palja_from_birth() {
        let pipeline = SajuPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&[]),
            "gpt-4.1-mini",
            request(Some("199011241030"), None),
        );

        let subject = pipeline.extract().await.unwrap();
        assert_eq!(subject.palja.compact_ko(), "경오정해계사정사");
        assert_eq!(subject.birth.as_deref(), Some("199011241030"));
    }

    #[tokio::test]
    async fn test_extract_prefers_given_palja() {
        let pipeline = SajuPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&[]),
            "gpt-4.1-mini",
            request(Some("198212010250"), Some("임술신해정묘경자")),
        );

        let subject = pipeline.extract().await.unwrap();
        assert_eq!(subject.palja.compact_ko(), "임술신해정묘경자");
    }

    #[tokio::test]
    async fn test_extract_requires_birth_or_palja() {
        let pipeline = SajuPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&[]),
            "gpt-4.1-mini",
            request(Some("  "), None),
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, PaljaError::MissingInput { .. }));
    }

    #[tokio::test]
    async fn test_transform_and_load() {
        let llm = ScriptedLlm::new(&[
            "결과입니다:\n{\"nickname\": \"차분한 물결\", \"summary\": \"조용한 관찰자\"}\n감사합니다",
        ]);
        let storage = MockStorage::new();
        let pipeline = SajuPipeline::new(
            storage.clone(),
            llm.clone(),
            "gpt-4.1-mini",
            request(Some("199011241030"), Some("경오정해계사정사")),
        );

        let subject = pipeline.extract().await.unwrap();
        let result = pipeline.transform(subject).await.unwrap();
        assert_eq!(result.summary["nickname"], "차분한 물결");

        match &llm.calls()[..] {
            [Call::Text(req)] => {
                assert_eq!(req.model, "gpt-4.1-mini");
                assert_eq!(req.temperature, 0.6);
                assert!(req.prompt.contains("경오 / 정해 / 계사 / 정사"));
            }
            other => panic!("unexpected calls: {:?}", other),
        }

        let saved = pipeline.load(result).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("saju_interpretation_male_199011241030_경오정해계사정사_"));
        assert!(saved[0].ends_with(".json"));

        let data = storage.get_file(&saved[0]).await.unwrap();
        let written: Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(written["summary"], "조용한 관찰자");
        // pretty-printed
        assert!(String::from_utf8(data).unwrap().contains("\n  \""));
    }

    #[tokio::test]
    async fn test_transform_rejects_prose_reply() {
        let pipeline = SajuPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&["죄송합니다, 해석할 수 없습니다."]),
            "gpt-4.1-mini",
            request(None, Some("경오정해계사정사")),
        );

        let subject = pipeline.extract().await.unwrap();
        let err = pipeline.transform(subject).await.unwrap_err();
        assert!(matches!(err, PaljaError::LlmJson { .. }));
    }
}
