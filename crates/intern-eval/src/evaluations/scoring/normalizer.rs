use crate::evaluations::domain::RawSubScore;

/// Upper bound of every normalized score.
pub const NORMALIZED_MAX: f64 = 10.0;

/// Round to one decimal place, the precision every persisted score carries.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Normalize a composite field from its supplied sub-scores.
///
/// The effective maximum scales with the number of sub-scores actually
/// supplied, so a parent maximum declared on the form is never consulted.
pub fn normalize_composite(sub_scores: &[RawSubScore], per_sub_field_max: f64) -> f64 {
    normalize_composite_by(sub_scores, |_| per_sub_field_max)
}

/// Normalize a composite field whose sub-fields declare their own maxima.
///
/// The effective maximum is the sum of `max_for` over the supplied sub-scores.
pub fn normalize_composite_by<F>(sub_scores: &[RawSubScore], max_for: F) -> f64
where
    F: Fn(&RawSubScore) -> f64,
{
    let sum: f64 = sub_scores.iter().map(|sub| sub.score).sum();
    let effective_max: f64 = sub_scores.iter().map(max_for).sum();
    scale(sum, effective_max)
}

/// Normalize a field scored directly against its declared maximum.
pub fn normalize_simple(raw_score: f64, declared_max: f64) -> f64 {
    scale(raw_score, declared_max)
}

fn scale(raw: f64, max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 {
        return 0.0;
    }
    round1((raw / max * NORMALIZED_MAX).clamp(0.0, NORMALIZED_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(scores: &[f64]) -> Vec<RawSubScore> {
        scores
            .iter()
            .enumerate()
            .map(|(index, score)| RawSubScore::new(format!("sub{}", index + 1), *score))
            .collect()
    }

    #[test]
    fn full_marks_reach_ten_regardless_of_sub_field_count() {
        assert_eq!(normalize_composite(&subs(&[5.0, 5.0, 5.0]), 5.0), 10.0);
        assert_eq!(normalize_composite(&subs(&[5.0, 5.0]), 5.0), 10.0);
    }

    #[test]
    fn empty_sub_scores_normalize_to_zero() {
        assert_eq!(normalize_composite(&[], 5.0), 0.0);
    }

    #[test]
    fn zero_maximum_yields_zero() {
        assert_eq!(normalize_simple(4.0, 0.0), 0.0);
        assert_eq!(normalize_composite(&subs(&[3.0]), 0.0), 0.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        // 23 / 30 * 10 = 7.666...
        assert_eq!(normalize_composite(&subs(&[5.0, 5.0, 5.0, 4.0, 4.0, 0.0]), 5.0), 7.7);
        assert_eq!(normalize_simple(2.0, 3.0), 6.7);
        assert_eq!(round1(7.25), 7.3);
    }

    #[test]
    fn simple_scores_are_bounded() {
        assert_eq!(normalize_simple(15.0, 10.0), 10.0);
        assert_eq!(normalize_simple(-1.0, 10.0), 0.0);
        assert_eq!(normalize_simple(7.0, 10.0), 7.0);
    }

    #[test]
    fn mixed_sub_field_maxima_sum_per_supplied_score() {
        let scores = subs(&[5.0, 10.0]);
        let max_for = |sub: &RawSubScore| if sub.sub_field_name == "sub1" { 5.0 } else { 10.0 };

        assert_eq!(normalize_composite_by(&scores, max_for), 10.0);
        // 5 / 5 * 10, only the first sub-field supplied
        assert_eq!(normalize_composite_by(&scores[..1], max_for), 10.0);
        assert_eq!(normalize_composite_by(&subs(&[2.5, 5.0]), max_for), 5.0);
    }

    #[test]
    fn partial_sub_scores_scale_to_ten() {
        assert_eq!(normalize_composite(&subs(&[3.0, 3.0, 3.0]), 5.0), 6.0);
        assert_eq!(normalize_composite(&subs(&[1.0, 2.0, 4.0]), 5.0), 4.7);
    }
}
