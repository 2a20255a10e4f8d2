pub mod config;
pub mod deal;
pub mod effects;
pub mod env;
pub mod observation;
pub mod policy;
pub mod record;
pub mod reward;
pub mod rules;
pub mod scoring;
