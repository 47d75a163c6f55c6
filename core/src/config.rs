//! Simulation configuration.
//!
//! Loaded once at startup and never mutated mid-run. Every tunable
//! constant in the simulation lives here; code never hard-codes a
//! rate or threshold that belongs to a section below.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width:         i32,
    pub height:        i32,
    /// Fraction of cells assigned as farms, in [0, 1].
    pub farm_fraction: f64,
    /// Fraction of cells assigned as mines, in [0, 1].
    pub mine_fraction: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width:         30,
            height:        30,
            farm_fraction: 0.12,
            mine_fraction: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub consumers: usize,
    pub producers: usize,
    pub traders:   usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            consumers: 12,
            producers: 6,
            traders:   4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Price adjustment sensitivity (α in the feedback rule).
    pub price_alpha:           f64,
    /// Starting price for every good.
    pub initial_price:         f64,
    pub initial_wealth_min:    f64,
    pub initial_wealth_max:    f64,
    /// Initial per-good inventory is drawn uniformly from [0, this).
    pub initial_inventory_max: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            price_alpha:           0.1,
            initial_price:         1.0,
            initial_wealth_min:    50.0,
            initial_wealth_max:    100.0,
            initial_inventory_max: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub max_health:       f64,
    /// Health lost per tick without food.
    pub decay_rate:       f64,
    /// Health gained per tick with food, capped at max_health.
    pub recovery_rate:    f64,
    /// Food consumed per tick to maintain health.
    pub consumption_rate: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health:       100.0,
            decay_rate:       1.0,
            recovery_rate:    1.0,
            consumption_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionConfig {
    /// Ore consumed to craft one tool.
    pub ore_per_tool: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self { ore_per_tool: 2.0 }
    }
}

/// The full simulation configuration. All sections are optional in
/// the JSON file; missing sections fall back to canonical defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world:      WorldConfig,
    pub population: PopulationConfig,
    pub economy:    EconomyConfig,
    pub health:     HealthConfig,
    pub production: ProductionConfig,
}

impl SimConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |reason: String| SimError::InvalidConfig { reason };

        if self.world.width <= 0 || self.world.height <= 0 {
            return Err(invalid(format!(
                "world dimensions must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.world.farm_fraction + self.world.mine_fraction > 1.0 {
            return Err(invalid(format!(
                "farm_fraction + mine_fraction must not exceed 1.0, got {}",
                self.world.farm_fraction + self.world.mine_fraction
            )));
        }
        if self.economy.price_alpha <= 0.0 {
            return Err(invalid(format!(
                "price_alpha must be positive, got {}",
                self.economy.price_alpha
            )));
        }
        if self.economy.initial_wealth_min > self.economy.initial_wealth_max {
            return Err(invalid(format!(
                "initial wealth range is inverted: [{}, {}]",
                self.economy.initial_wealth_min, self.economy.initial_wealth_max
            )));
        }
        if self.health.max_health <= 0.0 {
            return Err(invalid(format!(
                "max_health must be positive, got {}",
                self.health.max_health
            )));
        }
        if self.production.ore_per_tool <= 0.0 {
            return Err(invalid(format!(
                "ore_per_tool must be positive, got {}",
                self.production.ore_per_tool
            )));
        }
        Ok(())
    }

    /// A small world for fast tests.
    pub fn default_test() -> Self {
        Self {
            world: WorldConfig {
                width:         10,
                height:        10,
                farm_fraction: 0.12,
                mine_fraction: 0.08,
            },
            population: PopulationConfig {
                consumers: 4,
                producers: 2,
                traders:   2,
            },
            ..Self::default()
        }
    }
}
