//! Coordinator configuration parameters.

use serde::{Deserialize, Serialize};

use crate::agent::PolicyKind;

/// Coordinator configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Prefix marking automated player ids (default: "AI_").
    /// Players with this prefix are re-spawned when a dormant room wakes up.
    pub ai_id_prefix: String,

    /// Display name given to automated players.
    pub ai_display_name: String,

    /// Root seed for agent RNG streams.
    /// Each agent derives its own stream from this seed and its player id.
    pub agent_seed: u64,

    /// Pause before an agent submits a move, in milliseconds.
    pub agent_move_delay_ms: u64,

    /// Move selection used by spawned agents.
    pub agent_policy: PolicyKind,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ai_id_prefix: "AI_".to_string(),
            ai_display_name: "AI".to_string(),
            agent_seed: 42,
            agent_move_delay_ms: 0,
            agent_policy: PolicyKind::WinFirst,
        }
    }
}

impl CoordinatorConfig {
    /// Create a new config with a custom agent seed.
    pub fn with_agent_seed(mut self, seed: u64) -> Self {
        self.agent_seed = seed;
        self
    }

    /// Create a new config with a custom agent move delay.
    pub fn with_agent_move_delay_ms(mut self, delay_ms: u64) -> Self {
        self.agent_move_delay_ms = delay_ms;
        self
    }

    /// Create a new config with a custom agent policy.
    pub fn with_agent_policy(mut self, policy: PolicyKind) -> Self {
        self.agent_policy = policy;
        self
    }

    /// Create a new config with a custom AI id prefix.
    pub fn with_ai_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ai_id_prefix = prefix.into();
        self
    }

    /// Whether a player id belongs to an automated player.
    #[must_use]
    pub fn is_ai_player(&self, player_id: &str) -> bool {
        player_id.starts_with(&self.ai_id_prefix)
    }
}
