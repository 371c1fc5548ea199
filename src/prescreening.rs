//! Pre-screening form model.
//!
//! Three steps: basic info, research formats, language/availability. The
//! form only accepts updates for fields on its current step, and the only
//! value check is the numeric age input. On completion the collected
//! `PreScreeningData` goes to the caller's callback. The chat responder does
//! not consume it.

use serde::Serialize;

use crate::models::enums::{Availability, Gender, Language, ResearchType};
use crate::models::PreScreeningData;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreScreeningError {
    #[error("Unknown form step: {0}")]
    UnknownStep(u8),
    #[error("Field {field} is not on step {step}")]
    FieldNotOnStep { field: &'static str, step: u8 },
    #[error("Age must be a whole number: {0}")]
    InvalidAge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    BasicInfo,
    ResearchTypes,
    LanguageAvailability,
}

impl FormStep {
    pub const ALL: [FormStep; 3] = [
        FormStep::BasicInfo,
        FormStep::ResearchTypes,
        FormStep::LanguageAvailability,
    ];

    /// Steps are numbered from 1, as the wizard shows them.
    pub fn from_index(index: u8) -> Result<Self, PreScreeningError> {
        match index {
            1 => Ok(Self::BasicInfo),
            2 => Ok(Self::ResearchTypes),
            3 => Ok(Self::LanguageAvailability),
            other => Err(PreScreeningError::UnknownStep(other)),
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::ResearchTypes => 2,
            Self::LanguageAvailability => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "基本情報",
            Self::ResearchTypes => "参加可能な研究形式",
            Self::LanguageAvailability => "言語・参加可能時間",
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1).ok()
    }
}

// ═══════════════════════════════════════════
// Field descriptions
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Text,
    Select,
    MultiSelect,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldOption {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepSchema {
    pub index: u8,
    pub step: FormStep,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    pub fields: Vec<FieldSchema>,
}

macro_rules! options {
    ($ty:ty) => {
        <$ty>::ALL
            .iter()
            .map(|o| FieldOption {
                id: o.as_str(),
                label: o.label(),
            })
            .collect::<Vec<_>>()
    };
}

/// Description of one step, for whoever renders the form.
pub fn step_schema(step: FormStep) -> StepSchema {
    let (hint, fields) = match step {
        FormStep::BasicInfo => (
            None,
            vec![
                FieldSchema {
                    name: "age",
                    label: "年齢",
                    kind: FieldKind::Number,
                    placeholder: Some("例: 25"),
                    options: Vec::new(),
                },
                FieldSchema {
                    name: "gender",
                    label: "性別",
                    kind: FieldKind::Select,
                    placeholder: None,
                    options: options!(Gender),
                },
                FieldSchema {
                    name: "location",
                    label: "お住まいの地域",
                    kind: FieldKind::Text,
                    placeholder: Some("例: 東京都"),
                    options: Vec::new(),
                },
            ],
        ),
        FormStep::ResearchTypes => (
            Some("該当するものをすべて選択してください"),
            vec![FieldSchema {
                name: "research_types",
                label: "参加可能な研究形式",
                kind: FieldKind::MultiSelect,
                placeholder: None,
                options: options!(ResearchType),
            }],
        ),
        FormStep::LanguageAvailability => (
            None,
            vec![
                FieldSchema {
                    name: "language",
                    label: "対応可能な言語",
                    kind: FieldKind::Select,
                    placeholder: None,
                    options: options!(Language),
                },
                FieldSchema {
                    name: "availability",
                    label: "参加可能な時間帯",
                    kind: FieldKind::Select,
                    placeholder: None,
                    options: options!(Availability),
                },
            ],
        ),
    };

    StepSchema {
        index: step.index(),
        step,
        title: step.title(),
        hint,
        fields,
    }
}

pub fn form_schema() -> Vec<StepSchema> {
    FormStep::ALL.into_iter().map(step_schema).collect()
}

// ═══════════════════════════════════════════
// Form state
// ═══════════════════════════════════════════

/// A single input change, as produced by one form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Raw text of the numeric input. Blank clears the value.
    Age(String),
    /// `None` is the "選択してください" placeholder.
    Gender(Option<Gender>),
    Location(String),
    ResearchType { kind: ResearchType, checked: bool },
    Language(Option<Language>),
    Availability(Option<Availability>),
}

impl FieldUpdate {
    fn field(&self) -> &'static str {
        match self {
            Self::Age(_) => "age",
            Self::Gender(_) => "gender",
            Self::Location(_) => "location",
            Self::ResearchType { .. } => "research_types",
            Self::Language(_) => "language",
            Self::Availability(_) => "availability",
        }
    }

    fn step(&self) -> FormStep {
        match self {
            Self::Age(_) | Self::Gender(_) | Self::Location(_) => FormStep::BasicInfo,
            Self::ResearchType { .. } => FormStep::ResearchTypes,
            Self::Language(_) | Self::Availability(_) => FormStep::LanguageAvailability,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreScreeningForm {
    step: FormStep,
    data: PreScreeningData,
}

impl PreScreeningForm {
    /// Start a form at the given 1-based step index.
    pub fn new(current_step: u8) -> Result<Self, PreScreeningError> {
        Ok(Self {
            step: FormStep::from_index(current_step)?,
            data: PreScreeningData::default(),
        })
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// The step index is driven by the host page.
    pub fn set_step(&mut self, current_step: u8) -> Result<(), PreScreeningError> {
        self.step = FormStep::from_index(current_step)?;
        Ok(())
    }

    pub fn data(&self) -> &PreScreeningData {
        &self.data
    }

    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), PreScreeningError> {
        if update.step() != self.step {
            return Err(PreScreeningError::FieldNotOnStep {
                field: update.field(),
                step: self.step.index(),
            });
        }

        match update {
            FieldUpdate::Age(raw) => {
                let raw = raw.trim();
                self.data.age = if raw.is_empty() {
                    None
                } else {
                    Some(
                        raw.parse::<u32>()
                            .map_err(|_| PreScreeningError::InvalidAge(raw.to_string()))?,
                    )
                };
            }
            FieldUpdate::Gender(gender) => self.data.gender = gender,
            FieldUpdate::Location(location) => {
                self.data.location = Some(location).filter(|l| !l.is_empty());
            }
            FieldUpdate::ResearchType { kind, checked } => {
                let types = self.data.research_types.get_or_insert_with(Default::default);
                if checked {
                    types.insert(kind);
                } else {
                    types.remove(&kind);
                }
            }
            FieldUpdate::Language(language) => self.data.language = language,
            FieldUpdate::Availability(availability) => self.data.availability = availability,
        }
        Ok(())
    }

    /// Hand the collected answers to `on_complete`. The form can be
    /// completed from any step, with whatever has been filled in.
    pub fn complete<F>(&self, on_complete: F)
    where
        F: FnOnce(PreScreeningData),
    {
        tracing::debug!(step = self.step.index(), "Pre-screening form completed");
        on_complete(self.data.clone());
    }
}
