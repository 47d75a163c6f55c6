//! gridmarket-core — a deterministic, discrete-tick, agent-based
//! market simulation.
//!
//! A seeded grid world of farms, mines, and market cells is walked
//! by consumers, producers, and traders. Each tick every live agent
//! chooses one action from a rule-based policy, the engine applies
//! the actions sequentially against the shared market, health and
//! consumption settle, and prices adjust from the tick's aggregate
//! demand/supply flow.
//!
//! RULES:
//!   - All randomness flows through seeded SimRng streams; two runs
//!     with the same seed produce identical tick-by-tick summaries.
//!   - The policy reads state and never mutates it; only the engine
//!     applies actions.
//!   - Fallible per-agent operations return ok/fail flags and no-op
//!     on failure; nothing inside the tick loop returns an error.

pub mod action;
pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod market;
pub mod metrics;
pub mod policy;
pub mod rng;
pub mod types;
