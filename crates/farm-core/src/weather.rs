//! Daily weather: the fixed distribution, weighted selection and the rules
//! for turning multipliers into growth, production and energy effects.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather condition of a single day.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
    Cloudy,
    Stormy,
    Drought,
}

impl Weather {
    pub const ALL: [Weather; 5] = [
        Weather::Sunny,
        Weather::Rainy,
        Weather::Cloudy,
        Weather::Stormy,
        Weather::Drought,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Rainy => "rainy",
            Weather::Cloudy => "cloudy",
            Weather::Stormy => "stormy",
            Weather::Drought => "drought",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Probability weight and effect multipliers of one weather condition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherDef {
    pub id: Weather,
    /// Share of days with this weather; all weights sum to 1.0.
    pub weight: f64,
    /// >= 1.0 always advances crops; below 1.0 it is the chance to advance.
    pub growth_multiplier: f64,
    /// Same rule as growth, applied to animal production countdowns.
    pub production_multiplier: f64,
    /// Scales action energy costs, rounded up.
    pub energy_multiplier: Decimal,
}

/// Ordered weather distribution. Selection walks entries in this order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherTable {
    pub entries: Vec<WeatherDef>,
}

impl WeatherTable {
    /// sunny 35%, rainy 25%, cloudy 25%, stormy 10%, drought 5%.
    pub fn standard() -> Self {
        let def = |id, weight, growth, production, energy: Decimal| WeatherDef {
            id,
            weight,
            growth_multiplier: growth,
            production_multiplier: production,
            energy_multiplier: energy,
        };
        Self {
            entries: vec![
                def(Weather::Sunny, 0.35, 1.0, 1.0, Decimal::ONE),
                def(Weather::Rainy, 0.25, 1.2, 0.9, Decimal::new(11, 1)),
                def(Weather::Cloudy, 0.25, 0.9, 1.0, Decimal::ONE),
                def(Weather::Stormy, 0.10, 0.6, 0.5, Decimal::new(15, 1)),
                def(Weather::Drought, 0.05, 0.4, 0.8, Decimal::new(13, 1)),
            ],
        }
    }

    pub fn get(&self, id: Weather) -> Option<&WeatherDef> {
        self.entries.iter().find(|w| w.id == id)
    }

    /// Map a uniform value `r` in [0, 1) to a weather: the first entry whose
    /// cumulative weight reaches `r`, or the last entry if rounding leaves
    /// nothing selected.
    pub fn select(&self, r: f64) -> Weather {
        let mut cumulative = 0.0;
        for w in &self.entries {
            cumulative += w.weight;
            if cumulative >= r {
                return w.id;
            }
        }
        self.entries.last().map(|w| w.id).unwrap_or_default()
    }

    /// Draw the weather for a new day.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Weather {
        let r: f64 = rng.gen();
        self.select(r)
    }

    /// Energy multiplier for `id`, neutral when the table lacks the entry.
    pub fn energy_multiplier(&self, id: Weather) -> Decimal {
        self.get(id).map_or(Decimal::ONE, |w| w.energy_multiplier)
    }
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whether a countdown moves by one day under `multiplier`.
///
/// Multipliers >= 1.0 always advance; smaller ones advance with probability
/// equal to the multiplier (one Bernoulli trial per field or animal).
pub fn progresses<R: Rng + ?Sized>(multiplier: f64, rng: &mut R) -> bool {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return false;
    }
    if multiplier >= 1.0 {
        return true;
    }
    rng.gen_bool(multiplier)
}

/// `ceil(base * multiplier)`, saturating at `u32::MAX` so an out-of-range
/// cost can never be afforded.
pub fn adjusted_energy_cost(base: u32, multiplier: Decimal) -> u32 {
    (Decimal::from(base) * multiplier)
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}
