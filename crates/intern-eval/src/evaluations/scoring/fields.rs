use std::collections::{BTreeMap, BTreeSet};

use super::config::{OverMaxPolicy, ScoringConfig};
use super::normalizer::{normalize_composite_by, normalize_simple};
use crate::evaluations::domain::{
    FieldDefinition, NormalizedFieldScore, RawFieldInput, RawSubScore,
};
use crate::evaluations::validation::ValidationError;

/// Produce one normalized score per form field, in form order.
///
/// Every field is required, inputs naming fields outside the form are
/// rejected, and the whole submission fails on the first violation.
pub fn aggregate(
    form_fields: &[FieldDefinition],
    inputs: &[RawFieldInput],
    config: &ScoringConfig,
) -> Result<Vec<NormalizedFieldScore>, ValidationError> {
    let mut by_name: BTreeMap<&str, &RawFieldInput> = BTreeMap::new();
    for input in inputs {
        if form_fields.iter().all(|field| field.name != input.field_name) {
            return Err(ValidationError::UnknownField {
                field: input.field_name.clone(),
            });
        }
        if by_name.insert(input.field_name.as_str(), input).is_some() {
            return Err(ValidationError::DuplicateField {
                field: input.field_name.clone(),
            });
        }
    }

    form_fields
        .iter()
        .map(|field| {
            let input = by_name.get(field.name.as_str()).ok_or_else(|| {
                ValidationError::MissingFieldScore {
                    field: field.name.clone(),
                }
            })?;
            score_field(field, input, config)
        })
        .collect()
}

fn score_field(
    field: &FieldDefinition,
    input: &RawFieldInput,
    config: &ScoringConfig,
) -> Result<NormalizedFieldScore, ValidationError> {
    match (&input.sub_scores, input.score) {
        (Some(sub_scores), direct)
            if field.is_composite() && (!sub_scores.is_empty() || direct.is_none()) =>
        {
            let sub_scores = checked_sub_scores(field, sub_scores, config)?;
            let score = normalize_composite_by(&sub_scores, |sub| {
                sub_field_max(field, &sub.sub_field_name, config)
            });
            Ok(NormalizedFieldScore {
                field_name: field.name.clone(),
                score,
                sub_scores,
            })
        }
        (Some(sub_scores), _) if !field.is_composite() && !sub_scores.is_empty() => {
            Err(ValidationError::UnknownSubField {
                field: field.name.clone(),
                sub_field: sub_scores[0].sub_field_name.clone(),
            })
        }
        (_, Some(raw)) => {
            let max = direct_max(field, config);
            let raw = checked_score(&field.name, raw, max, config.over_max_policy)?;
            Ok(NormalizedFieldScore {
                field_name: field.name.clone(),
                score: normalize_simple(raw, max),
                sub_scores: Vec::new(),
            })
        }
        (_, None) => Err(ValidationError::MissingFieldScore {
            field: field.name.clone(),
        }),
    }
}

fn sub_field_max(field: &FieldDefinition, sub_field_name: &str, config: &ScoringConfig) -> f64 {
    field
        .sub_field(sub_field_name)
        .and_then(|sub| sub.max_value)
        .unwrap_or(config.default_sub_field_max)
}

/// Maximum for a direct score. A composite field without a declared parent
/// maximum uses the sum of its sub-field maxima.
fn direct_max(field: &FieldDefinition, config: &ScoringConfig) -> f64 {
    match field.max_value {
        Some(max) => max,
        None if field.is_composite() => field
            .sub_fields
            .iter()
            .map(|sub| sub.max_value.unwrap_or(config.default_sub_field_max))
            .sum(),
        None => config.default_simple_max,
    }
}

fn checked_sub_scores(
    field: &FieldDefinition,
    sub_scores: &[RawSubScore],
    config: &ScoringConfig,
) -> Result<Vec<RawSubScore>, ValidationError> {
    let mut seen = BTreeSet::new();
    sub_scores
        .iter()
        .map(|sub| {
            let definition = field.sub_field(&sub.sub_field_name).ok_or_else(|| {
                ValidationError::UnknownSubField {
                    field: field.name.clone(),
                    sub_field: sub.sub_field_name.clone(),
                }
            })?;
            if !seen.insert(sub.sub_field_name.as_str()) {
                return Err(ValidationError::DuplicateSubField {
                    field: field.name.clone(),
                    sub_field: sub.sub_field_name.clone(),
                });
            }

            let max = definition
                .max_value
                .unwrap_or(config.default_sub_field_max);
            let target = format!("{} / {}", field.name, sub.sub_field_name);
            let score = checked_score(&target, sub.score, max, config.over_max_policy)?;
            Ok(RawSubScore {
                sub_field_name: sub.sub_field_name.clone(),
                score,
            })
        })
        .collect()
}

fn checked_score(
    target: &str,
    value: f64,
    max: f64,
    policy: OverMaxPolicy,
) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidScore {
            target: target.to_string(),
            value,
        });
    }

    if value > max {
        return match policy {
            OverMaxPolicy::Clamp => Ok(max),
            OverMaxPolicy::Reject => Err(ValidationError::ScoreAboveMaximum {
                target: target.to_string(),
                value,
                max,
            }),
        };
    }

    Ok(value)
}
