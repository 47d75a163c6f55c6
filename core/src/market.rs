//! Market — per-good price and stock ledger.
//!
//! The market accumulates demand/supply flow during a tick and
//! recomputes prices once at tick end. The price rule is a
//! first-order feedback controller, not a clearing auction: it
//! reacts to the previous tick's aggregate flow, so a buy executed
//! at a stale price that a later sell in the same tick does not see
//! is expected behavior, not a bug.

use crate::config::EconomyConfig;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Prices never fall below this floor.
pub const PRICE_FLOOR: f64 = 0.01;

/// The tradeable goods. The set is closed: every inventory and every
/// market ledger carries exactly these entries, decided at compile
/// time so the hot per-tick path stays branch-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Good {
    Food,
    Ore,
    Tools,
}

impl Good {
    pub const ALL: [Good; 3] = [Good::Food, Good::Ore, Good::Tools];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Ore => "ore",
            Self::Tools => "tools",
        }
    }
}

/// A fixed mapping with one slot per good. Never grows or shrinks,
/// so allocation and iteration costs are flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerGood<T> {
    pub food:  T,
    pub ore:   T,
    pub tools: T,
}

impl<T> Index<Good> for PerGood<T> {
    type Output = T;

    fn index(&self, good: Good) -> &T {
        match good {
            Good::Food => &self.food,
            Good::Ore => &self.ore,
            Good::Tools => &self.tools,
        }
    }
}

impl<T> IndexMut<Good> for PerGood<T> {
    fn index_mut(&mut self, good: Good) -> &mut T {
        match good {
            Good::Food => &mut self.food,
            Good::Ore => &mut self.ore,
            Good::Tools => &mut self.tools,
        }
    }
}

/// Ledger entry for a single good.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodState {
    /// Available stock, >= 0.
    pub quantity: f64,
    /// Current price per unit, clamped to PRICE_FLOOR.
    pub price:    f64,
}

pub struct Market {
    goods:  PerGood<GoodState>,
    /// Demand accumulated this tick, reset by update_prices().
    demand: PerGood<f64>,
    /// Supply accumulated this tick, reset by update_prices().
    supply: PerGood<f64>,
    alpha:  f64,
}

impl Market {
    pub fn new(economy: &EconomyConfig) -> Self {
        let mut goods = PerGood::<GoodState>::default();
        for good in Good::ALL {
            goods[good] = GoodState {
                quantity: 0.0,
                price:    economy.initial_price,
            };
        }
        Self {
            goods,
            demand: PerGood::default(),
            supply: PerGood::default(),
            alpha: economy.price_alpha,
        }
    }

    pub fn price(&self, good: Good) -> f64 {
        self.goods[good].price
    }

    pub fn quantity(&self, good: Good) -> f64 {
        self.goods[good].quantity
    }

    /// Attempt to buy `quantity` units. Fails if the market holds
    /// less stock than requested, or if `max_price` is given and the
    /// current price exceeds it. On success the stock is decremented,
    /// the demand accumulator credited, and the total cost returned.
    ///
    /// Wealth does not move here — the engine quotes the cost against
    /// the agent's wealth before calling, so a committed purchase is
    /// always paid for.
    pub fn buy(&mut self, good: Good, quantity: f64, max_price: Option<f64>) -> (bool, f64) {
        let state = &self.goods[good];

        if state.quantity < quantity {
            return (false, 0.0);
        }
        if let Some(max_price) = max_price {
            if state.price > max_price {
                return (false, 0.0);
            }
        }

        self.demand[good] += quantity;

        let total_cost = state.price * quantity;
        self.goods[good].quantity -= quantity;

        (true, total_cost)
    }

    /// Attempt to sell `quantity` units. Fails only if `min_price` is
    /// given and the current price is below it — the market always
    /// absorbs supply. On success the stock is incremented, the
    /// supply accumulator credited, and the total revenue returned.
    pub fn sell(&mut self, good: Good, quantity: f64, min_price: Option<f64>) -> (bool, f64) {
        let state = &self.goods[good];

        if let Some(min_price) = min_price {
            if state.price < min_price {
                return (false, 0.0);
            }
        }

        self.supply[good] += quantity;

        let total_revenue = state.price * quantity;
        self.goods[good].quantity += quantity;

        (true, total_revenue)
    }

    /// Direct stock injection from production. Counts as supply for
    /// the end-of-tick price update; no price effect until then.
    pub fn add_supply(&mut self, good: Good, quantity: f64) {
        self.goods[good].quantity += quantity;
        self.supply[good] += quantity;
    }

    /// Recompute every price from this tick's accumulated flow, then
    /// reset the accumulators for the next tick.
    ///
    /// Rule: price *= 1 + α·(demand − supply)/supply when supply > 0;
    /// with no supply, price rises with raw demand, or decays slightly
    /// toward equilibrium when the good saw no activity at all.
    pub fn update_prices(&mut self) {
        for good in Good::ALL {
            let demand = self.demand[good];
            let supply = self.supply[good];

            let price_change = if supply > 0.0 {
                self.alpha * (demand - supply) / supply
            } else if demand > 0.0 {
                self.alpha * demand
            } else {
                -self.alpha * 0.1
            };

            let state = &mut self.goods[good];
            state.price = (state.price * (1.0 + price_change)).max(PRICE_FLOOR);

            self.demand[good] = 0.0;
            self.supply[good] = 0.0;
        }
    }
}
