// crates/core/src/lib.rs
pub mod classify;
pub mod config;
pub mod error;
pub mod paths;
pub mod retention;
pub mod smart_tail;
pub mod text;
pub mod transcript;
pub mod types;

pub use classify::classify_state;
pub use config::*;
pub use error::*;
pub use retention::*;
pub use smart_tail::*;
pub use transcript::*;
pub use types::*;
