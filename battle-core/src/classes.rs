//! Evolution tier tables for the mage and tank class lines.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

// Index = tier - 1.
static MAGE_FIREBALL_MULTIPLIERS: Lazy<[Decimal; 6]> = Lazy::new(|| {
    [
        Decimal::new(110, 2),
        Decimal::new(120, 2),
        Decimal::new(130, 2),
        Decimal::new(150, 2),
        Decimal::new(175, 2),
        Decimal::new(200, 2),
    ]
});

static TANK_REFLECTION: Lazy<[Decimal; 7]> = Lazy::new(|| {
    let mut table = [Decimal::ZERO; 7];
    for (idx, slot) in table.iter_mut().enumerate() {
        *slot = Decimal::new(4 * (idx as i64 + 1), 2);
    }
    table
});

/// Fireball damage multiplier for a mage evolution tier; `None` outside the mage line.
pub fn fireball_multiplier(tier: u8) -> Option<Decimal> {
    if tier == 0 {
        return None;
    }
    let idx = (tier as usize - 1).min(MAGE_FIREBALL_MULTIPLIERS.len() - 1);
    Some(MAGE_FIREBALL_MULTIPLIERS[idx])
}

/// Reflection fraction granted by a tank evolution tier.
pub fn tank_reflection(tier: u8) -> Decimal {
    if tier == 0 {
        return Decimal::ZERO;
    }
    let idx = (tier as usize - 1).min(TANK_REFLECTION.len() - 1);
    TANK_REFLECTION[idx]
}
