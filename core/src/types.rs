//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one full decide/apply/settle cycle.
pub type Tick = u64;

/// A stable, unique identifier for an agent ("c_0", "p_12", "t_20").
/// Assigned once at population creation and never reused.
pub type AgentId = String;
