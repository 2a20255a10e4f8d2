use crate::error::DealError;
use crate::game::config::DealConfig;
use crate::game::deal::Deal;
use crate::game::observation::Observation;
use crate::game::reward::{self, RewardConfig};
use crate::model::card::Card;
use crate::model::declaration::Declaration;
use crate::model::player::{Player, Seat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Seat driven through [`GongzhuEnv::step`]; every other seat uses its policy.
    pub agent: Seat,
    pub deal: DealConfig,
    pub reward: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            agent: Seat::North,
            deal: DealConfig::default(),
            reward: RewardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Play(Card),
    Declare(Declaration),
}

#[derive(Debug, Clone)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
}

/// Single-agent view of a deal. Other seats are auto-played between agent turns.
pub struct GongzhuEnv {
    deal: Deal,
    config: EnvConfig,
}

impl GongzhuEnv {
    pub fn new(players: [Player; 4], config: EnvConfig, seed: u64) -> Result<Self, DealError> {
        let mut deal = Deal::with_seed(players, config.deal, seed)?;
        deal.play_until(config.agent)?;
        Ok(Self { deal, config })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn deal(&self) -> &Deal {
        &self.deal
    }

    pub fn agent(&self) -> Seat {
        self.config.agent
    }

    pub fn observation(&self) -> Observation {
        self.deal.observation(self.config.agent)
    }

    /// Redeals to the current players and fast-forwards to the agent's turn.
    pub fn reset(&mut self, seed: u64) -> Result<Observation, DealError> {
        self.deal.reset(seed)?;
        self.deal.play_until(self.config.agent)?;
        Ok(self.observation())
    }

    /// Like [`GongzhuEnv::reset`] but seats a new set of players.
    pub fn reset_with_players(
        &mut self,
        players: [Player; 4],
        seed: u64,
    ) -> Result<Observation, DealError> {
        self.deal = Deal::with_seed(players, self.config.deal, seed)?;
        self.deal.play_until(self.config.agent)?;
        Ok(self.observation())
    }

    pub fn step(&mut self, action: Action) -> Result<Step, DealError> {
        let agent = self.config.agent;
        let team = agent.team();
        let before = reward::advantage(&self.deal, team);

        match action {
            Action::Play(card) => self.deal.play_card(agent, card)?,
            Action::Declare(declaration) => self.deal.declare(agent, declaration)?,
        }
        self.deal.play_until(agent)?;

        let after = reward::advantage(&self.deal, team);
        let done = self.deal.is_end_of_deal();
        Ok(Step {
            observation: self.observation(),
            reward: self.config.reward.step_reward(before, after, done),
            done,
        })
    }

    pub fn into_players(self) -> [Player; 4] {
        self.deal.into_players()
    }
}
