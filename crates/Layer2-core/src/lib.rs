//! ignite-core: Core Runtime for Ignite
//!
//! Layer2 - bundle loading and service lifecycle
//!
//! # 주요 모듈
//!
//! - `loader`: per-bundle Module Loader (delegation rules, unit cache, transformer chain)
//! - `scanner`: read-only metadata scan of bundle archives
//! - `service`: service records, lifecycle interface, adapter synthesizer
//! - `orchestrator`: bootstrap and start/stop of every adapter
//! - `runtime`: symbol table, defined units, host runtime
//!
//! # 사용 예시
//!
//! ```ignore
//! use ignite_core::{HostRuntime, Orchestrator, OrchestratorConfig};
//!
//! let host = Arc::new(HostRuntime::with_builtins());
//! let orchestrator = Orchestrator::new(host, OrchestratorConfig::default());
//!
//! orchestrator.bootstrap(&[PathBuf::from("services/clock.bundle")])?;
//! orchestrator.start_all().into_result()?;
//! // ...
//! orchestrator.stop_all().into_result()?;
//! ```

// Core modules
pub mod bundle;
pub mod loader;
pub mod orchestrator;
pub mod runtime;
pub mod scanner;
pub mod service;

// Re-exports: Bundle
pub use bundle::Bundle;

// Re-exports: Loader
pub use loader::{
    DelegationRules, FnTransformer, ModuleLoader, ModuleLoaderBuilder, OuterResolver,
    ResolveError, ResolveResult, Route, TransformError, Transformed, Transformer, UnitSource,
    UnitState,
};

// Re-exports: Orchestrator
pub use orchestrator::{
    BootstrapError, BundleRuntime, BundleSummary, LifecycleFailure, LifecyclePhase,
    LifecycleReport, Orchestrator, OrchestratorConfig,
};

// Re-exports: Runtime
pub use runtime::{
    CompiledFunction, HostRuntime, InvokeError, LoadedUnit, NativeFn, SymbolTable, UnitOrigin,
    NOOP_SYMBOL,
};

// Re-exports: Scanner
pub use scanner::{MetadataScanner, ServiceClassifier, UnitInspector};

// Re-exports: Service
pub use service::{
    Lifecycle, LifecycleSynthesizer, ServiceAdapter, ServiceRecord, ServiceRecordBuilder,
    UnitHandle, START_ENTRY, STOP_ENTRY,
};
