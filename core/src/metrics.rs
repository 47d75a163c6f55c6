//! Aggregate metrics — per-tick time series and the read-only
//! summary snapshot consumed by runners and dashboards.

use crate::{
    market::PerGood,
    types::Tick,
};
use serde::{Deserialize, Serialize};

/// Time series appended once per tick, fixed key set for the whole
/// run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSeries {
    pub total_wealth: Vec<f64>,
    pub agent_count:  Vec<usize>,
    pub prices:       PerGood<Vec<f64>>,
}

impl MetricsSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, total_wealth: f64, agent_count: usize, prices: PerGood<f64>) {
        self.total_wealth.push(total_wealth);
        self.agent_count.push(agent_count);
        self.prices.food.push(prices.food);
        self.prices.ore.push(prices.ore);
        self.prices.tools.push(prices.tools);
    }

    pub fn len(&self) -> usize {
        self.total_wealth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_wealth.is_empty()
    }
}

/// Read-only state snapshot — the sole channel consumed by
/// visualization and reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub tick:             Tick,
    pub live_agent_count: usize,
    pub total_wealth:     f64,
    pub prices:           PerGood<f64>,
    pub quantities:       PerGood<f64>,
}
