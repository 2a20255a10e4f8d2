//! Self-play arena for Gongzhu policies.
//!
//! A YAML file names the agents and how many deals to play. Deals run on
//! worker threads, each finished deal is appended to a JSONL log, and the
//! team Elo ratings are summarised per policy kind in Markdown.

pub mod arena;
pub mod config;
pub mod logging;
