//! # Runtime
//!
//! The defined side of the pipeline: native symbols, linked unit functions,
//! and the host runtime that module loaders delegate platform units to.

mod host;
mod symbols;
mod unit;

pub use host::{HostRuntime, NOOP_SYMBOL};
pub use symbols::{NativeFn, SymbolTable};
pub use unit::{CompiledFunction, InvokeError, LoadedUnit, UnitOrigin};
