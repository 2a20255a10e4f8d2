pub mod error;
pub mod game;
pub mod model;

pub use error::{CardError, DealError, DeclarationError};

pub struct EngineInfo;

impl EngineInfo {
    pub const fn name() -> &'static str {
        "gongzhu"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
