//! Feedback-driven field reshaping.

use super::ProbabilityField;

/// Largest change one feedback event may apply to a single slot.
pub const MAX_STEP: f64 = 0.3;

/// Reinforce (`accepted`) or penalize the slots around `index`.
///
/// Each slot moves by `±1 / (distance + 3)`, bounded to `[0, 1]` and to at
/// most [`MAX_STEP`] from its previous value. The peak is at `index` and
/// decays with distance, so a single feedback never saturates the field.
/// `index` may lie outside the field; distances are measured all the same.
pub fn adjust(field: &ProbabilityField, index: i64, accepted: bool) -> ProbabilityField {
    let sign = if accepted { 1.0 } else { -1.0 };
    let values = field
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let d = (i as i64 - index).unsigned_abs() as f64;
            let raw = (p + sign / (d + 3.0)).max(0.0);
            let lo = (p - MAX_STEP).max(0.0);
            let hi = (p + MAX_STEP).min(1.0);
            raw.max(lo).min(hi)
        })
        .collect();
    ProbabilityField::from_values(values)
}
