//! Luck modulation of effect application chance and duration.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Lowest chance an effect can be modulated down to.
pub fn chance_floor() -> Decimal {
    Decimal::new(5, 2)
}

/// Highest chance an effect can be modulated up to.
pub fn chance_ceiling() -> Decimal {
    Decimal::new(95, 2)
}

/// `clamp(base * (1 + (source_luck - target_luck) / 100), 0.05, 0.95)`.
pub fn modified_chance(
    base_chance: Decimal,
    source_luck: Decimal,
    target_luck: Decimal,
) -> Decimal {
    let shift = (source_luck - target_luck) / Decimal::ONE_HUNDRED;
    (base_chance * (Decimal::ONE + shift)).clamp(chance_floor(), chance_ceiling())
}

/// `max(1, base + floor((luck - 50) / 100 * 2))`.
pub fn modified_duration(base_duration: u32, luck: Decimal) -> u32 {
    let delta = ((luck - Decimal::from(50)) / Decimal::ONE_HUNDRED * Decimal::TWO).floor();
    let adjusted = Decimal::from(base_duration) + delta;
    if adjusted < Decimal::ONE {
        1
    } else {
        adjusted.to_u32().unwrap_or(u32::MAX)
    }
}
