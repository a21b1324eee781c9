//! Prompt templates for the model calls. Wording is content; only the
//! requested JSON keys are read back by the pipelines.

use crate::core::ganzhi::Palja;
use crate::domain::model::Sex;
use serde_json::Value;

pub fn saju_prompt(sex: Sex, birth: Option<&str>, palja: &Palja) -> String {
    let birth = birth.unwrap_or("unknown");
    format!(
        r#"You are a Saju (Four Pillars) based personality and relationship analyst.

Rules:
- Write everything in Korean
- Descriptive, not deterministic; no fate, wealth, health or lifespan claims
- Friendly and slightly witty tone
- Output ONLY valid JSON

Interpretation:
- Palja is the primary source. Birth information is context for age and generation only.
- Do not calculate missing pillars and do not reorder the pillars.
- Treat the day pillar as the centre of personality and read the other pillars against it.

Input:
- Sex: {sex}
- Birth: {birth}
- Palja (year / month / day / hour): {ordered}
- Palja with hanja: {hanja}
- Ten gods (stem, branch per pillar): {gods}

Return ONLY this JSON:
{{
  "nickname": "...",
  "sex": "...",
  "age": "...",
  "summary": "...",
  "content": "...",
  "ideal_partner": "...",
  "partner_tips": "..."
}}"#,
        sex = sex.as_word(),
        birth = birth,
        ordered = palja.slash_ordered(),
        hanja = palja.with_hanja(),
        gods = palja.ten_gods().join(", "),
    )
}

pub const FACE_FEATURE_PROMPT: &str = r#"You are a facial feature analyst.
Analyze the face in the image and answer ONLY with allowed enum values.

{
  "eyebrows": {
    "thickness": "thick | thin",
    "shape": "straight | arched | angled",
    "length": "longer_than_eye | shorter_than_eye",
    "distance_from_eye": "close | far",
    "neatness": "neat | messy",
    "tail_direction": "upward | downward"
  },
  "eyes": {
    "size": "large | medium | small",
    "shape": "round | almond | narrow",
    "eye_tail_direction": "upward | downward | neutral",
    "distance_between_eyes": "wide | average | narrow",
    "eyelid_type": "double | single | inner_double"
  },
  "nose": {
    "bridge_height": "high | medium | low",
    "bridge_width": "wide | medium | narrow",
    "tip_shape": "rounded | pointed | flat",
    "nostril_visibility": "high | medium | low"
  },
  "mouth": {
    "lip_thickness": "thick | medium | thin",
    "mouth_width": "wide | medium | narrow",
    "mouth_corner_direction": "upward | downward | neutral"
  },
  "face_shape": "oval | round | square | long | heart | diamond"
}

Do not add explanations outside the JSON."#;

pub fn physiognomy_prompt(features: &Value, sex: Sex, age: u32) -> String {
    let features = serde_json::to_string_pretty(features).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are a physiognomist.

Rules:
- Descriptive, not deterministic ("tends to", "likely", "may")
- summary, content, partner_summary and personality_match in Korean
- facial_feature_preferences in English, using the same categories as the input

Input:
- sex: {sex}
- age: {age}
- facial features:
{features}

Tasks:
1. One-line summary of the person
2. Overall impression from the facial features (content)
3. Partner sex, and whether an older, younger or similar-age partner suits best (partner_age as a number)
4. Partner facial features that complement, not copy, the input

Return ONLY this JSON:
{{
  "sex": "...",
  "age": "...",
  "summary": "...",
  "content": "...",
  "ideal_partner_physiognomy": {{
    "partner_summary": "...",
    "partner_age": 0,
    "partner_sex": "...",
    "facial_feature_preferences": {{
      "eyes": "...",
      "nose": "...",
      "mouth": "...",
      "face_shape": "..."
    }},
    "personality_match": "..."
  }}
}}"#,
        sex = sex.as_word(),
        age = age,
        features = features,
    )
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unspecified".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Portrait prompt for the partner described by a physiognomy interpretation.
pub fn partner_image_prompt(interpretation: &Value, sex: Sex, age: u32) -> String {
    let partner = interpretation.get("ideal_partner_physiognomy");
    let prefs = partner.and_then(|p| p.get("facial_feature_preferences"));
    let pref = |key: &str| text_of(prefs.and_then(|p| p.get(key)));

    let partner_sex = match partner.and_then(|p| p.get("partner_sex")) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => match sex {
            Sex::Male => "woman".to_string(),
            Sex::Female => "man".to_string(),
            Sex::Unknown => "person".to_string(),
        },
    };
    let partner_age = match partner.and_then(|p| p.get("partner_age")) {
        Some(v) if !v.is_null() => text_of(Some(v)),
        _ => age.to_string(),
    };

    format!(
        r#"Generate a realistic head-and-shoulders portrait of a {partner_sex} around {partner_age} years old
with a warm, trustworthy and approachable impression.

Facial features:
- Eyes: {eyes}
- Nose: {nose}
- Lips: {mouth}
- Face shape: {face_shape}

Styling: natural hair, soft neutral-toned clothing, minimal accessories.
Background: calm modern interior or soft studio gradient.
Style: photorealistic, natural skin texture, soft daylight, shallow depth of field,
modern East Asian aesthetics, subject centred in a square frame."#,
        partner_sex = partner_sex,
        partner_age = partner_age,
        eyes = pref("eyes"),
        nose = pref("nose"),
        mouth = pref("mouth"),
        face_shape = pref("face_shape"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saju_prompt_carries_ordered_pillars() {
        let palja = Palja::parse_ko("경오정해계사정사").unwrap();
        let prompt = saju_prompt(Sex::Male, Some("199011241030"), &palja);
        assert!(prompt.contains("경오 / 정해 / 계사 / 정사"));
        assert!(prompt.contains("Sex: male"));
        assert!(prompt.contains("Birth: 199011241030"));
        assert!(prompt.contains("\"partner_tips\""));
    }

    #[test]
    fn test_physiognomy_prompt_embeds_features() {
        let features = json!({"face_shape": "oval"});
        let prompt = physiognomy_prompt(&features, Sex::Female, 31);
        assert!(prompt.contains("\"face_shape\": \"oval\""));
        assert!(prompt.contains("age: 31"));
    }

    #[test]
    fn test_partner_image_prompt() {
        let interpretation = json!({
            "ideal_partner_physiognomy": {
                "partner_sex": "man",
                "partner_age": 35,
                "facial_feature_preferences": {
                    "eyes": "almond, neutral tail",
                    "nose": "medium bridge",
                    "mouth": "medium lips",
                    "face_shape": "oval"
                }
            }
        });
        let prompt = partner_image_prompt(&interpretation, Sex::Female, 31);
        assert!(prompt.contains("a man around 35 years old"));
        assert!(prompt.contains("Eyes: almond, neutral tail"));
        assert!(prompt.contains("Face shape: oval"));
    }

    #[test]
    fn test_partner_image_prompt_fallbacks() {
        let prompt = partner_image_prompt(&json!({}), Sex::Male, 40);
        assert!(prompt.contains("a woman around 40 years old"));
        assert!(prompt.contains("Nose: unspecified"));
    }
}
