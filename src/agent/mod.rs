//! Automated players.
//!
//! Agents are ordinary coordinator clients whose moves come from an
//! `AgentPolicy` instead of a person. Each agent gets its own deterministic
//! RNG stream derived from the configured seed and its player id.

mod policy;
mod runner;

pub use policy::{AgentPolicy, PolicyKind, UniformPolicy, WinFirstPolicy};
pub use runner::{spawn, Agent};
