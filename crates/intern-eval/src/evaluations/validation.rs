/// Reasons a submission, form draft or roster entry is rejected before anything is stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing score for required field '{field}'")]
    MissingFieldScore { field: String },
    #[error("field '{field}' is not part of this form")]
    UnknownField { field: String },
    #[error("field '{field}' was scored more than once")]
    DuplicateField { field: String },
    #[error("field '{field}' has no sub-field named '{sub_field}'")]
    UnknownSubField { field: String, sub_field: String },
    #[error("sub-field '{sub_field}' of '{field}' was scored more than once")]
    DuplicateSubField { field: String, sub_field: String },
    #[error("score {value} for '{target}' must be a finite number >= 0")]
    InvalidScore { target: String, value: f64 },
    #[error("score {value} for '{target}' exceeds declared maximum {max}")]
    ScoreAboveMaximum { target: String, value: f64, max: f64 },
    #[error("evaluation belongs to intern '{expected}', submission names '{found}'")]
    InternMismatch { expected: String, found: String },
    #[error("{what} must not be empty")]
    Blank { what: &'static str },
    #[error("form declares field '{field}' more than once")]
    DuplicateFieldDefinition { field: String },
    #[error("declared maximum for '{target}' must be a positive number")]
    InvalidMaximum { target: String },
    #[error("select at least one form and one intern")]
    EmptySelection,
}
