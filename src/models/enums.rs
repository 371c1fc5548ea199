use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The `labeled` form also generates `label()`, the Japanese text shown
/// next to the option in the site's forms.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
    (labeled $name:ident { $($variant:ident => $s:literal / $label:literal),+ $(,)? }) => {
        str_enum!($name { $($variant => $s),+ });

        impl $name {
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(ConversationStage {
    Greeting => "greeting",
    Prescreening => "prescreening",
    Qualification => "qualification",
    Scheduling => "scheduling",
});

impl Default for ConversationStage {
    fn default() -> Self {
        Self::Greeting
    }
}

str_enum!(labeled Gender {
    Male => "male" / "男性",
    Female => "female" / "女性",
    Other => "other" / "その他",
    PreferNotToSay => "prefer-not-to-say" / "回答しない",
});

str_enum!(labeled ResearchType {
    OnlineSurvey => "online-survey" / "オンライン調査",
    Interview => "interview" / "対面インタビュー",
    Experiment => "experiment" / "実験参加",
    FocusGroup => "focus-group" / "フォーカスグループ",
});

str_enum!(labeled Language {
    Japanese => "japanese" / "日本語",
    English => "english" / "英語",
    Chinese => "chinese" / "中国語",
    Spanish => "spanish" / "スペイン語",
    French => "french" / "フランス語",
    Other => "other" / "その他",
});

str_enum!(labeled Availability {
    WeekdayMorning => "weekday-morning" / "平日午前",
    WeekdayAfternoon => "weekday-afternoon" / "平日午後",
    WeekdayEvening => "weekday-evening" / "平日夜間",
    Weekend => "weekend" / "週末",
    Flexible => "flexible" / "柔軟に対応可能",
});
