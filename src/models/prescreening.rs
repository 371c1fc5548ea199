use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::{Availability, Gender, Language, ResearchType};

/// Answers collected by the pre-screening form. Every field is optional;
/// the form hands whatever was filled in to its completion callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreScreeningData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_types: Option<BTreeSet<ResearchType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

impl PreScreeningData {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_serializes_to_empty_object() {
        let json = serde_json::to_value(PreScreeningData::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn deserializes_form_ids() {
        let data: PreScreeningData = serde_json::from_value(serde_json::json!({
            "age": 25,
            "gender": "female",
            "location": "東京都",
            "research_types": ["online-survey", "interview"],
            "language": "japanese",
            "availability": "weekend"
        }))
        .unwrap();

        assert_eq!(data.age, Some(25));
        assert_eq!(data.gender, Some(Gender::Female));
        assert_eq!(data.research_types.as_ref().map(|t| t.len()), Some(2));
        assert_eq!(data.availability, Some(Availability::Weekend));
        assert!(!data.is_empty());
    }

    #[test]
    fn unknown_option_id_is_rejected() {
        let result: Result<PreScreeningData, _> =
            serde_json::from_value(serde_json::json!({ "language": "klingon" }));
        assert!(result.is_err());
    }
}
