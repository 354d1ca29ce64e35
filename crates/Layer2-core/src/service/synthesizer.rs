//! Lifecycle Adapter Synthesizer
//!
//! A transformer scoped to one bundle's service units. While a service's
//! bytes pass through the chain it checks the `startService`/`stopService`
//! pair and widens their visibility so the host can reach them. Once the
//! unit is defined, a [`ServiceAdapter`] bound to the defined unit is
//! registered on the bundle's record.

use super::adapter::{ServiceAdapter, UnitHandle};
use super::record::ServiceRecord;
use crate::loader::{TransformError, Transformed, Transformer};
use crate::runtime::LoadedUnit;
use ignite_foundation::{UnitImage, Visibility};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entry point run by `Lifecycle::start`
pub const START_ENTRY: &str = "startService";

/// Entry point run by `Lifecycle::stop`
pub const STOP_ENTRY: &str = "stopService";

pub struct LifecycleSynthesizer {
    record: Arc<ServiceRecord>,
}

impl LifecycleSynthesizer {
    pub const NAME: &'static str = "lifecycle-synthesizer";

    pub fn new(record: Arc<ServiceRecord>) -> Self {
        Self { record }
    }
}

/// Index of a static, parameterless, no-return function called `name`
fn entry_point(image: &UnitImage, name: &str) -> Option<usize> {
    image
        .functions
        .iter()
        .position(|f| f.name == name && f.is_parameterless_static() && f.returns.is_none())
}

impl Transformer for LifecycleSynthesizer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, unit: &str, bytes: &[u8]) -> Result<Transformed, TransformError> {
        if !self.record.is_service(unit) {
            return Ok(Transformed::Unchanged);
        }

        let mut image = UnitImage::decode(bytes)?;
        let (start, stop) = match (entry_point(&image, START_ENTRY), entry_point(&image, STOP_ENTRY)) {
            (Some(start), Some(stop)) => (start, stop),
            (Some(_), None) => {
                return Err(TransformError::LifecycleMismatch(format!("missing {}", STOP_ENTRY)));
            }
            (None, Some(_)) => {
                return Err(TransformError::LifecycleMismatch(format!("missing {}", START_ENTRY)));
            }
            (None, None) => {
                debug!("{} is flagged as a service but has no entry points", unit);
                return Ok(Transformed::Unchanged);
            }
        };

        let mut widened = false;
        for index in [start, stop] {
            let function = &mut image.functions[index];
            if !function.access.is_public() {
                debug!("Widening {}.{} to public", unit, function.name);
                function.access.visibility = Visibility::Public;
                widened = true;
            }
        }

        if widened {
            Ok(Transformed::Rewritten(image.encode()?))
        } else {
            Ok(Transformed::Unchanged)
        }
    }

    fn on_defined(&self, unit: &Arc<LoadedUnit>) {
        if !self.record.is_service(unit.name()) {
            return;
        }

        let callable = |entry: &str| unit.function(entry).is_some_and(|f| f.is_externally_callable());
        if !(callable(START_ENTRY) && callable(STOP_ENTRY)) {
            if unit.function(START_ENTRY).is_some() || unit.function(STOP_ENTRY).is_some() {
                warn!("{} was defined without a callable entry point pair", unit.name());
            }
            return;
        }

        let handle = UnitHandle::new(self.record.bundle(), unit.name());
        let adapter = ServiceAdapter::new(handle, Arc::clone(unit));
        if self.record.add_adapter(Arc::new(adapter)) {
            info!("Synthesized lifecycle adapter for {}", unit.name());
        } else {
            debug!("Adapter for {} already registered", unit.name());
        }
    }
}
