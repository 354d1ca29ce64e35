//! # Services
//!
//! Service records produced by the scanner, the lifecycle interface, and the
//! synthesizer that turns flagged units into adapters.

mod adapter;
mod record;
mod synthesizer;

pub use adapter::{Lifecycle, ServiceAdapter, UnitHandle};
pub use record::{ServiceRecord, ServiceRecordBuilder};
pub use synthesizer::{LifecycleSynthesizer, START_ENTRY, STOP_ENTRY};
