//! Rule-based decision policy.
//!
//! Pure mapping from (agent, grid, market) to one action, branching
//! on role. The policy never mutates simulation state; the only
//! side effect is drawing from the decisions RNG stream for the
//! random-movement fallbacks, so every live agent can be decided
//! independently within a tick.

use crate::{
    action::{Action, Direction},
    agent::{Agent, Role},
    grid::{Grid, Terrain},
    market::{Good, Market},
    rng::SimRng,
};

// Fixed decision thresholds. Deliberately simple heuristics — the
// priority ladders below are the contract, not an economic model.
const CONSUMER_LOW_HEALTH: f64 = 50.0;
const CONSUMER_FOOD_RESERVE: f64 = 2.0;
const CONSUMER_FOOD_SURPLUS: f64 = 5.0;
const CONSUMER_LOW_WEALTH: f64 = 50.0;

const PRODUCER_ORE_FOR_TOOL: f64 = 2.0;
const PRODUCER_FOOD_SURPLUS: f64 = 3.0;
const PRODUCER_TOOL_SURPLUS: f64 = 2.0;

const TRADER_SELL_AT: [(Good, f64); 3] =
    [(Good::Food, 1.2), (Good::Ore, 1.5), (Good::Tools, 2.0)];
const TRADER_BUY_AT: [(Good, f64); 3] =
    [(Good::Food, 0.8), (Good::Ore, 1.0), (Good::Tools, 1.5)];

/// Choose an action for one live agent. First matching rule in the
/// role's priority ladder wins.
pub fn decide(agent: &Agent, grid: &Grid, market: &Market, rng: &mut SimRng) -> Action {
    match agent.role {
        Role::Consumer => decide_consumer(agent, grid, market, rng),
        Role::Producer => decide_producer(agent, grid, market, rng),
        Role::Trader => decide_trader(agent, grid, market, rng),
    }
}

/// Consumer ladder:
///   1. Low health or low food: buy food, else head for a market.
///   2. Surplus food and thin wallet: sell food.
///   3. Wander.
fn decide_consumer(agent: &Agent, grid: &Grid, market: &Market, rng: &mut SimRng) -> Action {
    let food_on_hand = agent.inventory[Good::Food];
    let food_price = market.price(Good::Food);

    if agent.health < CONSUMER_LOW_HEALTH || food_on_hand < CONSUMER_FOOD_RESERVE {
        if agent.can_afford(food_price) && market.quantity(Good::Food) > 0.0 {
            return Action::Buy { good: Good::Food };
        }
        if let Some(cell) = grid.nearest_market(agent.x, agent.y) {
            return move_toward(agent, cell.x, cell.y);
        }
    }

    if food_on_hand > CONSUMER_FOOD_SURPLUS && agent.wealth < CONSUMER_LOW_WEALTH {
        return Action::Sell { good: Good::Food };
    }

    Action::Move { direction: random_direction(rng) }
}

/// Producer ladder:
///   1. Adjacent to a farm: produce.
///   2. Adjacent to a mine: produce if enough ore held, else restock
///      ore from the market.
///   3. Sell surplus food, then surplus tools.
///   4. Not adjacent to any resource: head for the nearest one.
///   5. Stay or wander.
fn decide_producer(agent: &Agent, grid: &Grid, market: &Market, rng: &mut SimRng) -> Action {
    let adjacent = grid.resource_neighbors(agent.x, agent.y);
    let near_farm = adjacent.iter().any(|c| c.terrain == Terrain::Farm);
    let near_mine = adjacent.iter().any(|c| c.terrain == Terrain::Mine);

    if near_farm {
        return Action::Produce;
    }
    if near_mine {
        if agent.has_inventory(Good::Ore, PRODUCER_ORE_FOR_TOOL) {
            return Action::Produce;
        }
        let ore_price = market.price(Good::Ore);
        if agent.can_afford(ore_price) && market.quantity(Good::Ore) > 0.0 {
            return Action::Buy { good: Good::Ore };
        }
    }

    if agent.inventory[Good::Food] > PRODUCER_FOOD_SURPLUS {
        return Action::Sell { good: Good::Food };
    }
    if agent.inventory[Good::Tools] > PRODUCER_TOOL_SURPLUS {
        return Action::Sell { good: Good::Tools };
    }

    if adjacent.is_empty() {
        if let Some(cell) = grid.nearest_resource(agent.x, agent.y) {
            return move_toward(agent, cell.x, cell.y);
        }
    }

    // Stay or wander, uniformly among the five options.
    match rng.next_u64_below(5) {
        0 => Action::Stay,
        i => Action::Move { direction: Direction::ALL[(i - 1) as usize] },
    }
}

/// Trader ladder (arbitrage):
///   1. Sell any held good priced above its sell threshold, food
///      first, then ore, then tools.
///   2. Buy any good priced below its buy threshold, same order.
///   3. Head for the nearest market if farther than 1 cell away on
///      either axis.
///   4. Wander.
fn decide_trader(agent: &Agent, grid: &Grid, market: &Market, rng: &mut SimRng) -> Action {
    for (good, threshold) in TRADER_SELL_AT {
        if agent.has_inventory(good, 1.0) && market.price(good) > threshold {
            return Action::Sell { good };
        }
    }

    for (good, threshold) in TRADER_BUY_AT {
        let price = market.price(good);
        if price < threshold && agent.can_afford(price) && market.quantity(good) > 0.0 {
            return Action::Buy { good };
        }
    }

    if let Some(cell) = grid.nearest_market(agent.x, agent.y) {
        if (agent.x - cell.x).abs() > 1 || (agent.y - cell.y).abs() > 1 {
            return move_toward(agent, cell.x, cell.y);
        }
    }

    Action::Move { direction: random_direction(rng) }
}

/// One step toward a target: move along the axis with the larger
/// offset magnitude. An exact tie goes to the y axis; a zero offset
/// on both axes means the agent is already there and stays put.
fn move_toward(agent: &Agent, target_x: i32, target_y: i32) -> Action {
    let dx = target_x - agent.x;
    let dy = target_y - agent.y;

    let direction = if dx.abs() > dy.abs() {
        if dx > 0 { Direction::East } else { Direction::West }
    } else if dy > 0 {
        Direction::North
    } else if dy < 0 {
        Direction::South
    } else {
        return Action::Stay;
    };

    Action::Move { direction }
}

fn random_direction(rng: &mut SimRng) -> Direction {
    Direction::ALL[rng.next_u64_below(4) as usize]
}
