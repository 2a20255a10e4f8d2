pub mod policy;

pub use policy::{
    HeuristicPolicy, ModelPolicy, Policy, PolicyError, PolicyKind, PolicyParams, RandomPolicy,
};
