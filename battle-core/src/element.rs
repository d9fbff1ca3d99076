use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Element {
    Light,
    Dark,
    Corrupted,
    Nature,
    Electric,
    Water,
    Fire,
    Wind,
    #[default]
    Unknown,
}

impl Element {
    pub const fn as_str(self) -> &'static str {
        match self {
            Element::Light => "Light",
            Element::Dark => "Dark",
            Element::Corrupted => "Corrupted",
            Element::Nature => "Nature",
            Element::Electric => "Electric",
            Element::Water => "Water",
            Element::Fire => "Fire",
            Element::Wind => "Wind",
            Element::Unknown => "Unknown",
        }
    }

    /// Case-insensitive lookup; anything unrecognised is `Unknown`.
    pub fn parse(name: &str) -> Element {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Element::Light,
            "dark" => Element::Dark,
            "corrupted" => Element::Corrupted,
            "nature" => Element::Nature,
            "electric" => Element::Electric,
            "water" => Element::Water,
            "fire" => Element::Fire,
            "wind" => Element::Wind,
            _ => Element::Unknown,
        }
    }

    /// The element this one is strong against, if any.
    fn beats(self) -> Option<Element> {
        match self {
            Element::Light => Some(Element::Corrupted),
            Element::Dark => Some(Element::Light),
            Element::Corrupted => Some(Element::Dark),
            Element::Nature => Some(Element::Electric),
            Element::Electric => Some(Element::Water),
            Element::Water => Some(Element::Fire),
            Element::Fire => Some(Element::Nature),
            Element::Wind => Some(Element::Electric),
            Element::Unknown => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::parse(&value)
    }
}

impl From<Element> for String {
    fn from(value: Element) -> Self {
        value.as_str().to_string()
    }
}

/// Element-strength lookup consumed by attack resolution.
///
/// Returns a signed modifier; damage is multiplied by `1 + modifier`.
pub trait ElementTable: Send + Sync {
    fn strength(&self, attack: Element, defense: Element) -> Decimal;
}

/// Fixed advantage table: +0.20 when the attacker beats the defender, -0.20 the other way round.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardElementTable;

impl StandardElementTable {
    pub fn advantage() -> Decimal {
        Decimal::new(20, 2)
    }
}

impl ElementTable for StandardElementTable {
    fn strength(&self, attack: Element, defense: Element) -> Decimal {
        if attack == Element::Unknown || defense == Element::Unknown || attack == defense {
            return Decimal::ZERO;
        }
        if attack.beats() == Some(defense) {
            Self::advantage()
        } else if defense.beats() == Some(attack) {
            -Self::advantage()
        } else {
            Decimal::ZERO
        }
    }
}
