//! Shared fixtures for ignite-core integration tests

#![allow(dead_code)]

use ignite_core::{HostRuntime, SymbolTable, UnitSource};
use ignite_foundation::{
    Access, BundleWriter, FunctionDecl, Instruction, UnitImage, Visibility, SERVICE_TAG,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory bundle that counts byte lookups per name
pub struct CountingSource {
    location: PathBuf,
    units: HashMap<String, Arc<[u8]>>,
    lookups: parking_lot::Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new(images: &[UnitImage]) -> Arc<Self> {
        let units = images
            .iter()
            .map(|image| (image.name.clone(), Arc::<[u8]>::from(image.encode().unwrap())))
            .collect();
        Arc::new(Self {
            location: PathBuf::from("counting.bundle"),
            units,
            lookups: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    pub fn lookups(&self, name: &str) -> usize {
        self.lookups.lock().get(name).copied().unwrap_or(0)
    }
}

impl UnitSource for CountingSource {
    fn location(&self) -> &Path {
        &self.location
    }

    fn find_bytes(&self, name: &str) -> Option<Arc<[u8]>> {
        *self.lookups.lock().entry(name.to_string()).or_default() += 1;
        self.units.get(name).cloned()
    }
}

/// Register `symbol` as a counter and return the count handle
pub fn counter(symbols: &SymbolTable, symbol: &str) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&hits);
    symbols.register(symbol, move || {
        handle.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    hits
}

pub fn count(hits: &AtomicUsize) -> usize {
    hits.load(Ordering::SeqCst)
}

pub fn host() -> Arc<HostRuntime> {
    Arc::new(HostRuntime::with_builtins())
}

/// Static, parameterless entry point calling `symbol`
pub fn entry(name: &str, visibility: Visibility, symbol: &str) -> FunctionDecl {
    FunctionDecl::new(name)
        .with_access(Access::static_with(visibility))
        .with_body(vec![Instruction::log(format!("{} called", name)), Instruction::invoke(symbol)])
}

/// A service-flagged unit whose entry points hit `<name>.start` / `<name>.stop`
pub fn service_unit(name: &str, with_start: bool, with_stop: bool) -> UnitImage {
    let mut image = UnitImage::new(name).with_tag(SERVICE_TAG);
    if with_start {
        image = image.with_function(entry("startService", Visibility::Private, &format!("{}.start", name)));
    }
    if with_stop {
        image = image.with_function(entry("stopService", Visibility::Public, &format!("{}.stop", name)));
    }
    image
}

/// Write `images` into `<dir>/<file>` and return its path
pub fn write_bundle(dir: &Path, file: &str, images: &[UnitImage]) -> PathBuf {
    let path = dir.join(file);
    let mut writer = BundleWriter::create(&path).unwrap();
    for image in images {
        writer.add_unit(image).unwrap();
    }
    writer.finish().unwrap();
    path
}
