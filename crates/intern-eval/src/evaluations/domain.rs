use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::Grade;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier of an evaluation form.
    FormId
);
identifier!(
    /// Identifier of a registered intern.
    InternId
);
identifier!(
    /// Identifier of the tutor owning a form or authoring an evaluation.
    TutorId
);
identifier!(
    /// Identifier of one persisted evaluation.
    EvaluationId
);

/// Declared maximum for one sub-metric of a composite field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl SubFieldDefinition {
    pub fn new(name: impl Into<String>, max_value: f64) -> Self {
        Self {
            name: name.into(),
            max_value: Some(max_value),
        }
    }
}

/// One scorable rubric dimension. Composite when it declares sub-fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub sub_fields: Vec<SubFieldDefinition>,
}

impl FieldDefinition {
    pub fn simple(name: impl Into<String>, max_value: f64) -> Self {
        Self {
            name: name.into(),
            max_value: Some(max_value),
            sub_fields: Vec::new(),
        }
    }

    pub fn composite(name: impl Into<String>, sub_fields: Vec<SubFieldDefinition>) -> Self {
        let max_value = sub_fields
            .iter()
            .map(|sub| sub.max_value.unwrap_or(0.0))
            .sum::<f64>();
        Self {
            name: name.into(),
            max_value: Some(max_value),
            sub_fields,
        }
    }

    pub fn is_composite(&self) -> bool {
        !self.sub_fields.is_empty()
    }

    pub fn sub_field(&self, name: &str) -> Option<&SubFieldDefinition> {
        self.sub_fields.iter().find(|sub| sub.name == name)
    }
}

const STANDARD_RUBRIC: [(&str, [&str; 3]); 5] = [
    (
        "Technical Competence",
        [
            "Fundamentals Understanding",
            "Ability to Ask and Answer Questions",
            "Quiz Score",
        ],
    ),
    (
        "Communication",
        [
            "Active Listening",
            "Verbal Fluency + Articulation",
            "PPT + Way of Delivery (Clarity)",
        ],
    ),
    (
        "Learning & Adaptability",
        [
            "Efforts towards understanding",
            "Handling uncertainty",
            "Willingness to Receive Feedback",
        ],
    ),
    (
        "Initiative & Ownership",
        [
            "Volunteering for Demonstrations / Answers",
            "Asking Relevant Questions",
            "Recall During the Next Session",
        ],
    ),
    (
        "Professionalism",
        [
            "Respectful Communication",
            "Responsiveness in Team Communication",
            "Punctuality",
        ],
    ),
];

/// Sub-metric maximum used by the seeded standard rubric.
pub const STANDARD_SUB_FIELD_MAX: f64 = 5.0;

/// The five standard fields with their three sub-metrics each.
pub fn standard_fields() -> Vec<FieldDefinition> {
    STANDARD_RUBRIC
        .iter()
        .map(|(name, subs)| {
            FieldDefinition::composite(
                *name,
                subs.iter()
                    .map(|sub| SubFieldDefinition::new(*sub, STANDARD_SUB_FIELD_MAX))
                    .collect(),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormStatus {
    #[default]
    Active,
    Inactive,
}

impl FormStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FormStatus::Active => "Active",
            FormStatus::Inactive => "Inactive",
        }
    }
}

/// Ordered collection of standard and custom fields owned by a tutor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: FormId,
    pub name: String,
    pub tutor: TutorId,
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
}

impl FormDefinition {
    /// Build a form seeded with the standard rubric followed by `custom_fields`.
    pub fn with_standard_fields(
        id: FormId,
        name: impl Into<String>,
        tutor: TutorId,
        custom_fields: Vec<FieldDefinition>,
    ) -> Self {
        let mut fields = standard_fields();
        fields.extend(custom_fields);
        Self {
            id,
            name: name.into(),
            tutor,
            fields,
            status: FormStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FormStatus::Active
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Admin request to create a form; standard fields are always prepended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub name: String,
    pub tutor: TutorId,
    #[serde(default)]
    pub custom_fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub status: FormStatus,
}

/// Admin request to add an intern to the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternRegistration {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intern {
    pub id: InternId,
    pub name: String,
    pub email: String,
}

/// Raw tutor input for one sub-metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubScore {
    pub sub_field_name: String,
    pub score: f64,
}

impl RawSubScore {
    pub fn new(sub_field_name: impl Into<String>, score: f64) -> Self {
        Self {
            sub_field_name: sub_field_name.into(),
            score,
        }
    }
}

/// Raw tutor input for one field: a direct score or a set of sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFieldInput {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_scores: Option<Vec<RawSubScore>>,
}

impl RawFieldInput {
    pub fn direct(field_name: impl Into<String>, score: f64) -> Self {
        Self {
            field_name: field_name.into(),
            score: Some(score),
            sub_scores: None,
        }
    }

    pub fn with_sub_scores(field_name: impl Into<String>, sub_scores: Vec<RawSubScore>) -> Self {
        Self {
            field_name: field_name.into(),
            score: None,
            sub_scores: Some(sub_scores),
        }
    }
}

/// Payload a tutor submits for one intern against one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSubmission {
    pub intern: InternId,
    #[serde(default)]
    pub comment: String,
    pub field_scores: Vec<RawFieldInput>,
}

/// A field's 0-10 score plus the raw sub-scores it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFieldScore {
    pub field_name: String,
    pub score: f64,
    #[serde(default)]
    pub sub_scores: Vec<RawSubScore>,
}

impl NormalizedFieldScore {
    pub fn grade(&self) -> Grade {
        Grade::for_score(self.score)
    }
}

/// Persisted evaluation of one intern against one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub form: FormId,
    pub intern: InternId,
    pub tutor: TutorId,
    pub field_scores: Vec<NormalizedFieldScore>,
    pub final_score: f64,
    pub final_grade: Grade,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EvaluationRecord {
    pub fn field_score(&self, field_name: &str) -> Option<&NormalizedFieldScore> {
        self.field_scores
            .iter()
            .find(|field| field.field_name == field_name)
    }
}
