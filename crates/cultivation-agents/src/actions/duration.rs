//! Shared `duration_reduction` effect application for Timed actions (§4.2
//! "Timed": "Duration may be reduced by effect `duration_reduction` (clamped
//! ≤0.9)").

use rust_decimal::Decimal;

use cultivation_types::{EffectMap, EffectValue};

const MAX_REDUCTION: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Apply the agent's `duration_reduction` effect (if any) to `base_months`,
/// clamping the reduction fraction to at most 0.9 and the result to at least
/// one month.
#[must_use]
pub fn effective_duration(base_months: u64, effects: &EffectMap) -> u64 {
    let reduction = match effects.get("duration_reduction") {
        Some(EffectValue::Number(value)) => (*value).clamp(Decimal::ZERO, MAX_REDUCTION),
        _ => Decimal::ZERO,
    };

    let base = Decimal::from(base_months);
    let reduced = base * (Decimal::ONE - reduction);
    u64::try_from(reduced.round()).unwrap_or(1).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn no_effect_leaves_duration_unchanged() {
        assert_eq!(effective_duration(6, &EffectMap::new()), 6);
    }

    #[test]
    fn reduction_shortens_duration() {
        let mut effects = EffectMap::new();
        effects.insert(String::from("duration_reduction"), EffectValue::Number(Decimal::new(5, 1)));
        assert_eq!(effective_duration(6, &effects), 3);
    }

    #[test]
    fn reduction_is_clamped_to_ninety_percent() {
        let mut effects = EffectMap::new();
        effects.insert(String::from("duration_reduction"), EffectValue::Number(Decimal::ONE));
        assert_eq!(effective_duration(10, &effects), 1);
    }
}
