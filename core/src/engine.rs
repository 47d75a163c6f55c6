//! The simulation engine — one `step` call is one full tick.
//!
//! TICK CYCLE (fixed, documented, never reordered):
//!   1. Increment the tick counter.
//!   2. Decide one action per live agent (policy, random, or script).
//!   3. Apply each action sequentially in stable agent order.
//!   4. Health/consumption pass over all live agents.
//!   5. Market price update (once per tick, after all actions).
//!   6. Remove agents whose health reached zero — permanently.
//!   7. Append aggregate metrics.
//!
//! RULES:
//!   - Execution is single-threaded and sequential; later agents in
//!     the order see stock changes made by earlier agents this tick.
//!   - A failed buy/sell/move/produce is a silent no-op; the engine
//!     never retries within the same tick.
//!   - All randomness flows through the SimRng streams.

use crate::{
    action::Action,
    agent::{Agent, Role},
    config::SimConfig,
    error::SimResult,
    grid::{Grid, Terrain},
    market::{Good, Market, PerGood},
    metrics::{MetricsSeries, Summary},
    policy,
    rng::{RngStream, SimRng},
    types::{AgentId, Tick},
};
use std::collections::HashMap;

/// Every buy/sell/produce moves goods one unit at a time.
const TRADE_QUANTITY: f64 = 1.0;

/// Producer placement retries before settling for the last draw.
const PLACEMENT_ATTEMPTS: u32 = 100;

enum StepMode<'a> {
    /// Rule-based decisions for every live agent.
    Policy,
    /// Uniform action-id draw per agent (ids 0..=10).
    Random,
    /// Externally supplied actions; agents without an entry idle.
    Scripted(&'a HashMap<AgentId, Action>),
}

pub struct Simulation {
    config:       SimConfig,
    tick:         Tick,
    grid:         Grid,
    market:       Market,
    /// Live agents in creation order. Removal preserves order, so
    /// iteration order is stable for deterministic replay.
    agents:       Vec<Agent>,
    metrics:      MetricsSeries,
    decision_rng: SimRng,
}

impl Simulation {
    /// Build grid, market, and the fixed starting population from a
    /// validated config and a master seed.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;

        let mut terrain_rng = SimRng::for_stream(seed, RngStream::Terrain);
        let grid = Grid::generate(&config.world, &mut terrain_rng);

        let market = Market::new(&config.economy);

        let mut agent_rng = SimRng::for_stream(seed, RngStream::Agents);
        let agents = create_population(&config, &grid, &mut agent_rng);
        log::info!(
            "Created {} agents ({} consumers, {} producers, {} traders), seed={seed}",
            agents.len(),
            config.population.consumers,
            config.population.producers,
            config.population.traders,
        );

        Ok(Self {
            config,
            tick: 0,
            grid,
            market,
            agents,
            metrics: MetricsSeries::new(),
            decision_rng: SimRng::for_stream(seed, RngStream::Decisions),
        })
    }

    /// Advance one tick with rule-based decisions.
    pub fn step(&mut self) {
        self.advance(StepMode::Policy);
    }

    /// Advance one tick with uniform-random actions.
    pub fn step_random(&mut self) {
        self.advance(StepMode::Random);
    }

    /// Advance one tick applying externally supplied actions. Agents
    /// without an entry take no action; unknown ids are ignored.
    pub fn step_with(&mut self, actions: &HashMap<AgentId, Action>) {
        self.advance(StepMode::Scripted(actions));
    }

    fn advance(&mut self, mode: StepMode) {
        self.tick += 1;

        // Phase 2: every decision reads the pre-tick state. Actions
        // are collected first and applied afterwards, so decision
        // order cannot leak into decision outcomes.
        let decisions: Vec<Option<Action>> = self
            .agents
            .iter()
            .map(|agent| match &mode {
                StepMode::Policy => Some(policy::decide(
                    agent,
                    &self.grid,
                    &self.market,
                    &mut self.decision_rng,
                )),
                StepMode::Random => {
                    Action::from_id(self.decision_rng.next_u64_below(Action::RANDOM_ID_SPAN))
                }
                StepMode::Scripted(actions) => actions.get(&agent.id).copied(),
            })
            .collect();

        // Phase 3: sequential application in stable agent order.
        for (idx, decision) in decisions.into_iter().enumerate() {
            let Some(action) = decision else { continue };
            let wealth_before = self.agents[idx].wealth;
            self.apply_action(idx, action);

            let wealth_delta = self.agents[idx].wealth - wealth_before;
            let reward = action_reward(self.agents[idx].role, wealth_delta);
            log::trace!(
                "tick={} agent={} action={action:?} reward={reward:.3}",
                self.tick,
                self.agents[idx].id,
            );
        }

        self.update_health();
        self.market.update_prices();
        self.remove_dead_agents();
        self.record_metrics();

        log::debug!(
            "tick={} agents={} wealth={:.1} food_price={:.3}",
            self.tick,
            self.agents.len(),
            self.metrics.total_wealth.last().copied().unwrap_or(0.0),
            self.market.price(Good::Food),
        );
    }

    fn apply_action(&mut self, idx: usize, action: Action) {
        match action {
            Action::Stay => {}
            Action::Move { direction } => {
                let (dx, dy) = direction.delta();
                let (width, height) = (self.grid.width(), self.grid.height());
                self.agents[idx].move_by(dx, dy, width, height);
            }
            Action::Buy { good } => {
                // Quote first: stock is only decremented once the
                // agent is known to cover the cost, so a committed
                // purchase is always paid for.
                let quote = self.market.price(good) * TRADE_QUANTITY;
                if self.agents[idx].can_afford(quote) {
                    let (ok, cost) = self.market.buy(good, TRADE_QUANTITY, None);
                    if ok && self.agents[idx].spend(cost) {
                        self.agents[idx].add_inventory(good, TRADE_QUANTITY);
                    }
                }
            }
            Action::Sell { good } => {
                if self.agents[idx].remove_inventory(good, TRADE_QUANTITY) {
                    let (ok, revenue) = self.market.sell(good, TRADE_QUANTITY, None);
                    if ok {
                        self.agents[idx].earn(revenue);
                    }
                }
            }
            Action::Produce => {
                // No-op for non-producer roles.
                if self.agents[idx].role == Role::Producer {
                    self.produce(idx);
                }
            }
        }
    }

    /// Production: a farm neighbor yields food; otherwise a mine
    /// neighbor yields a tool when enough ore is held, or one raw
    /// ore. The farm check precedes the mine check, so an agent
    /// adjacent to both only farms this tick. Output is registered
    /// as market supply for the end-of-tick price update.
    fn produce(&mut self, idx: usize) {
        let (x, y) = (self.agents[idx].x, self.agents[idx].y);
        let adjacent = self.grid.resource_neighbors(x, y);
        let near_farm = adjacent.iter().any(|c| c.terrain == Terrain::Farm);
        let near_mine = adjacent.iter().any(|c| c.terrain == Terrain::Mine);

        if near_farm {
            self.agents[idx].add_inventory(Good::Food, 1.0);
            self.market.add_supply(Good::Food, 1.0);
            return;
        }
        if near_mine {
            let ore_per_tool = self.config.production.ore_per_tool;
            if self.agents[idx].remove_inventory(Good::Ore, ore_per_tool) {
                self.agents[idx].add_inventory(Good::Tools, 1.0);
                self.market.add_supply(Good::Tools, 1.0);
            } else {
                self.agents[idx].add_inventory(Good::Ore, 1.0);
                self.market.add_supply(Good::Ore, 1.0);
            }
        }
    }

    /// Phase 4: uniform for every role. Eating recovers health up to
    /// the cap; going hungry decays it, possibly below zero.
    fn update_health(&mut self) {
        let health = &self.config.health;
        for agent in &mut self.agents {
            if agent.remove_inventory(Good::Food, health.consumption_rate) {
                agent.health = (agent.health + health.recovery_rate).min(health.max_health);
            } else {
                agent.health -= health.decay_rate;
            }
        }
    }

    /// Phase 6: dead agents leave the live set permanently and are
    /// excluded from all subsequent decisions and metrics.
    fn remove_dead_agents(&mut self) {
        let before = self.agents.len();
        let tick = self.tick;
        self.agents.retain(|agent| {
            if !agent.is_alive() {
                log::debug!("tick={tick} agent={} died", agent.id);
            }
            agent.is_alive()
        });
        let removed = before - self.agents.len();
        if removed > 0 {
            log::info!("tick={} removed {removed} dead agents", self.tick);
        }
    }

    fn record_metrics(&mut self) {
        let total_wealth: f64 = self.agents.iter().map(|a| a.wealth).sum();
        let prices = PerGood {
            food:  self.market.price(Good::Food),
            ore:   self.market.price(Good::Ore),
            tools: self.market.price(Good::Tools),
        };
        self.metrics.record(total_wealth, self.agents.len(), prices);
    }

    /// Read-only snapshot of the current state.
    pub fn summary(&self) -> Summary {
        Summary {
            tick:             self.tick,
            live_agent_count: self.agents.len(),
            total_wealth:     self.agents.iter().map(|a| a.wealth).sum(),
            prices: PerGood {
                food:  self.market.price(Good::Food),
                ore:   self.market.price(Good::Ore),
                tools: self.market.price(Good::Tools),
            },
            quantities: PerGood {
                food:  self.market.quantity(Good::Food),
                ore:   self.market.quantity(Good::Ore),
                tools: self.market.quantity(Good::Tools),
            },
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Mutable agent access for scripted scenarios and tests.
    pub fn agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn metrics(&self) -> &MetricsSeries {
        &self.metrics
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

/// Reward scaling is the one other place role is dispatched on:
/// consumers are scored mainly on survival, so wealth movement only
/// counts a tenth; producers and traders are scored on profit.
fn action_reward(role: Role, wealth_delta: f64) -> f64 {
    match role {
        Role::Consumer => wealth_delta * 0.1,
        Role::Producer | Role::Trader => wealth_delta,
    }
}

/// Create the starting population: consumers uniformly at random,
/// producers retried up to PLACEMENT_ATTEMPTS draws for a spot on or
/// adjacent to a resource cell (the last draw stands if none hits),
/// traders uniformly at random. Ids are role-prefixed and numbered
/// by a single shared counter in creation order.
fn create_population(config: &SimConfig, grid: &Grid, rng: &mut SimRng) -> Vec<Agent> {
    let mut agents = Vec::with_capacity(
        config.population.consumers + config.population.producers + config.population.traders,
    );
    let mut next_id = 0usize;

    let random_position = |rng: &mut SimRng| {
        let x = rng.next_u64_below(grid.width() as u64) as i32;
        let y = rng.next_u64_below(grid.height() as u64) as i32;
        (x, y)
    };

    for _ in 0..config.population.consumers {
        let (x, y) = random_position(rng);
        let id = format!("{}_{next_id}", Role::Consumer.id_prefix());
        agents.push(Agent::new(id, Role::Consumer, x, y, config, rng));
        next_id += 1;
    }

    for _ in 0..config.population.producers {
        let (mut x, mut y) = random_position(rng);
        for _ in 1..PLACEMENT_ATTEMPTS {
            let on_resource = grid.cell_at(x, y).is_some_and(|c| c.is_resource());
            if on_resource || !grid.resource_neighbors(x, y).is_empty() {
                break;
            }
            (x, y) = random_position(rng);
        }
        let id = format!("{}_{next_id}", Role::Producer.id_prefix());
        agents.push(Agent::new(id, Role::Producer, x, y, config, rng));
        next_id += 1;
    }

    for _ in 0..config.population.traders {
        let (x, y) = random_position(rng);
        let id = format!("{}_{next_id}", Role::Trader.id_prefix());
        agents.push(Agent::new(id, Role::Trader, x, y, config, rng));
        next_id += 1;
    }

    agents
}
