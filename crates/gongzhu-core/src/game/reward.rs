//! Reward shaping for agents trained against the engine.
//!
//! While a deal runs the reward is the change in the agent team's score
//! advantage, scaled down. The final step reports the whole advantage.

use crate::game::deal::Deal;
use crate::model::player::Team;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Divisor applied to mid-deal rewards.
    pub scale: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

/// Score advantage of `team` over the other partnership.
pub fn advantage(deal: &Deal, team: Team) -> f64 {
    deal.team_score(team) - deal.team_score(team.opponent())
}

impl RewardConfig {
    pub fn step_reward(&self, before: f64, after: f64, done: bool) -> f64 {
        if done {
            after
        } else if self.scale == 0.0 {
            after - before
        } else {
            (after - before) / self.scale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RewardConfig;

    #[test]
    fn running_rewards_are_scaled() {
        let config = RewardConfig::default();
        assert_eq!(config.step_reward(0.0, -100.0, false), -10.0);
    }

    #[test]
    fn final_reward_is_full_advantage() {
        let config = RewardConfig::default();
        assert_eq!(config.step_reward(-50.0, 200.0, true), 200.0);
    }
}
