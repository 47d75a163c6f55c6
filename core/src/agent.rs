//! Agents — the mutable entities that move, trade, and produce.
//!
//! RULE: No decision logic lives here. An agent exposes predicates
//! and mutators; the policy module chooses actions and the engine
//! applies them.

use crate::{
    config::SimConfig,
    market::{Good, PerGood},
    rng::SimRng,
    types::AgentId,
};
use serde::{Deserialize, Serialize};

/// Behavioral category, fixed for the agent's lifetime. Determines
/// the decision branch, the reward scaling, and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Consumer,
    Producer,
    Trader,
}

impl Role {
    /// Id prefix: "c_0", "p_12", "t_20".
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Consumer => "c",
            Self::Producer => "p",
            Self::Trader => "t",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id:        AgentId,
    pub role:      Role,
    pub x:         i32,
    pub y:         i32,
    pub wealth:    f64,
    /// Bounded above by max_health; may go negative from decay.
    /// Aliveness is evaluated against 0 only at removal time.
    pub health:    f64,
    pub inventory: PerGood<f64>,
}

impl Agent {
    /// Create an agent with wealth and inventory drawn from the
    /// configured ranges via the shared deterministic RNG.
    pub fn new(id: AgentId, role: Role, x: i32, y: i32, config: &SimConfig, rng: &mut SimRng) -> Self {
        let wealth = rng.range_f64(
            config.economy.initial_wealth_min,
            config.economy.initial_wealth_max,
        );
        let mut inventory = PerGood::<f64>::default();
        for good in Good::ALL {
            inventory[good] = rng.range_f64(0.0, config.economy.initial_inventory_max);
        }
        Self {
            id,
            role,
            x,
            y,
            wealth,
            health: config.health.max_health,
            inventory,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn can_afford(&self, price: f64) -> bool {
        self.wealth >= price
    }

    /// Deduct wealth. Fails with no mutation if wealth is short.
    pub fn spend(&mut self, amount: f64) -> bool {
        if self.wealth < amount {
            return false;
        }
        self.wealth -= amount;
        true
    }

    pub fn earn(&mut self, amount: f64) {
        self.wealth += amount;
    }

    pub fn has_inventory(&self, good: Good, quantity: f64) -> bool {
        self.inventory[good] >= quantity
    }

    pub fn add_inventory(&mut self, good: Good, quantity: f64) {
        self.inventory[good] += quantity;
    }

    /// Remove goods. Fails with no mutation if the holding is short.
    pub fn remove_inventory(&mut self, good: Good, quantity: f64) -> bool {
        if !self.has_inventory(good, quantity) {
            return false;
        }
        self.inventory[good] -= quantity;
        true
    }

    /// Apply a movement delta. No-op returning false if the result
    /// would leave [0, width) × [0, height).
    pub fn move_by(&mut self, dx: i32, dy: i32, width: i32, height: i32) -> bool {
        let new_x = self.x + dx;
        let new_y = self.y + dy;

        if new_x < 0 || new_x >= width || new_y < 0 || new_y >= height {
            return false;
        }
        self.x = new_x;
        self.y = new_y;
        true
    }
}
