//! Core compute library for the ascension dashboard.
//!
//! Three pillars: the save codec (obfuscated save text in, tolerant
//! `SaveState` out), `BigNumber` arithmetic for quantities that outgrow
//! f64, and the ascension optimizer (continuous climb model plus
//! golden-section search). Game reference data is injected through
//! `GameCatalog`; nothing in here mutates a save or talks to the network.

pub mod bignum;
pub mod catalog;
pub mod codec;
pub mod damage;
pub mod error;
pub mod optimizer;
pub mod save;
pub mod types;

pub use bignum::BigNumber;
pub use catalog::GameCatalog;
pub use error::{CoreError, CoreResult, SaveError};
pub use optimizer::{Optimizer, SimulationResult};
pub use save::SaveState;
pub use types::PlayStyle;
