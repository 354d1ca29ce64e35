//! Loaded units - the defined, callable form of a compiled unit

use super::symbols::{NativeFn, SymbolTable};
use crate::loader::ResolveError;
use anyhow::Context;
use ignite_foundation::{Access, FunctionDecl, Instruction, MetadataTag, UnitImage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Where a defined unit came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrigin {
    /// Defined by a bundle's module loader
    Bundle(PathBuf),
    /// Provided by the host runtime
    Host,
}

/// Errors from calling into a defined unit
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("unit '{unit}' has no function '{function}'")]
    NoSuchFunction { unit: String, function: String },

    #[error("{unit}.{function} is not externally callable")]
    NotCallable { unit: String, function: String },

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

// ============================================================================
// CompiledFunction
// ============================================================================

enum Step {
    Log(String),
    Invoke { symbol: String, target: NativeFn },
    Fail(String),
}

/// A function body linked against the symbol table
pub struct CompiledFunction {
    unit: String,
    name: String,
    access: Access,
    params: usize,
    steps: Vec<Step>,
}

impl CompiledFunction {
    /// Link `decl`; fails with the first unbound symbol
    pub fn compile(unit: &str, decl: &FunctionDecl, symbols: &SymbolTable) -> Result<Self, String> {
        let mut steps = Vec::with_capacity(decl.body.len());
        for instruction in &decl.body {
            steps.push(match instruction {
                Instruction::Log { message } => Step::Log(message.clone()),
                Instruction::Invoke { symbol } => {
                    let target = symbols.get(symbol).ok_or_else(|| {
                        format!("{}.{} references unbound symbol '{}'", unit, decl.name, symbol)
                    })?;
                    Step::Invoke {
                        symbol: symbol.clone(),
                        target,
                    }
                }
                Instruction::Fail { message } => Step::Fail(message.clone()),
            });
        }

        Ok(Self {
            unit: unit.to_string(),
            name: decl.name.clone(),
            access: decl.access,
            params: decl.params.len(),
            steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Public, module-level and parameterless
    pub fn is_externally_callable(&self) -> bool {
        self.access.is_public() && self.access.is_static && self.params == 0
    }

    /// Run the body
    pub fn call(&self) -> anyhow::Result<()> {
        for step in &self.steps {
            match step {
                Step::Log(message) => {
                    info!(target: "ignite::unit", unit = %self.unit, function = %self.name, "{}", message);
                }
                Step::Invoke { symbol, target } => {
                    target().with_context(|| {
                        format!("{}.{} -> {} failed", self.unit, self.name, symbol)
                    })?;
                }
                Step::Fail(message) => {
                    anyhow::bail!("{}.{}: {}", self.unit, self.name, message);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("unit", &self.unit)
            .field("name", &self.name)
            .field("access", &self.access)
            .field("steps", &self.steps.len())
            .finish()
    }
}

// ============================================================================
// LoadedUnit
// ============================================================================

/// A unit in the `Defined` state
#[derive(Debug)]
pub struct LoadedUnit {
    name: String,
    origin: UnitOrigin,
    tags: Vec<MetadataTag>,
    functions: HashMap<String, CompiledFunction>,
    bytes: Arc<[u8]>,
}

impl LoadedUnit {
    /// Decode, validate and link `bytes` as unit `name`
    pub fn define(
        name: &str,
        bytes: &[u8],
        symbols: &SymbolTable,
        origin: UnitOrigin,
    ) -> Result<Self, ResolveError> {
        let definition_error = |reason: String| ResolveError::DefinitionError {
            name: name.to_string(),
            reason,
        };

        let image = UnitImage::decode(bytes).map_err(|e| definition_error(e.to_string()))?;
        if image.name != name {
            return Err(definition_error(format!(
                "bytes declare unit '{}' (wrong name)",
                image.name
            )));
        }

        let mut functions = HashMap::with_capacity(image.functions.len());
        for decl in &image.functions {
            if functions.contains_key(&decl.name) {
                return Err(definition_error(format!("duplicate function '{}'", decl.name)));
            }
            let compiled = CompiledFunction::compile(name, decl, symbols).map_err(definition_error)?;
            functions.insert(decl.name.clone(), compiled);
        }

        Ok(Self {
            name: image.name,
            origin,
            tags: image.tags,
            functions,
            bytes: Arc::from(bytes),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &UnitOrigin {
        &self.origin
    }

    pub fn tags(&self) -> &[MetadataTag] {
        &self.tags
    }

    pub fn has_tag(&self, descriptor: &str) -> bool {
        self.tags.iter().any(|t| t.descriptor == descriptor)
    }

    /// The bytes this unit was defined from (after transformation)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.get(name)
    }

    /// Declared function names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Call an externally callable function by name
    pub fn invoke(&self, function: &str) -> Result<(), InvokeError> {
        let target = self
            .functions
            .get(function)
            .ok_or_else(|| InvokeError::NoSuchFunction {
                unit: self.name.clone(),
                function: function.to_string(),
            })?;

        if !target.is_externally_callable() {
            return Err(InvokeError::NotCallable {
                unit: self.name.clone(),
                function: function.to_string(),
            });
        }

        target.call().map_err(InvokeError::Failed)
    }
}
