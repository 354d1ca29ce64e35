//! Compiled unit image
//!
//! Layout: `IGNU` magic, little-endian `u16` format version, then the
//! bincode-encoded [`UnitImage`]. The image carries the unit's metadata tags
//! and its function table; function bodies are interpreted by the runtime.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Leading magic of every compiled unit
pub const UNIT_MAGIC: [u8; 4] = *b"IGNU";

/// Current unit format version
pub const UNIT_FORMAT_VERSION: u16 = 1;

/// Archive entry suffix marking a compiled unit
pub const UNIT_SUFFIX: &str = ".unit";

/// Marker tag: unit is a lifecycle-managed service
pub const SERVICE_TAG: &str = "ignite.Service";

/// Marker tag: unit is trackable
pub const TRACKABLE_TAG: &str = "ignite.TrackableUnit";

const HEADER_LEN: usize = UNIT_MAGIC.len() + 2;

// ============================================================================
// Access
// ============================================================================

/// Function visibility, narrowest last
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

/// Access modifiers of a declared function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub visibility: Visibility,

    /// Module-level function (no instance receiver)
    #[serde(default)]
    pub is_static: bool,
}

impl Access {
    /// Public module-level function
    pub fn public_static() -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: true,
        }
    }

    /// Module-level function with the given visibility
    pub fn static_with(visibility: Visibility) -> Self {
        Self {
            visibility,
            is_static: true,
        }
    }

    /// Instance function with the given visibility
    pub fn instance(visibility: Visibility) -> Self {
        Self {
            visibility,
            is_static: false,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

// ============================================================================
// Function bodies
// ============================================================================

/// One step of an interpreted function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Emit an info-level log line
    Log { message: String },

    /// Call a native symbol registered by the host
    Invoke { symbol: String },

    /// Abort the call with an error
    Fail { message: String },
}

impl Instruction {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub fn invoke(symbol: impl Into<String>) -> Self {
        Self::Invoke {
            symbol: symbol.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            message: message.into(),
        }
    }
}

/// A function declared by a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,

    #[serde(default)]
    pub access: Access,

    /// Parameter type names
    #[serde(default)]
    pub params: Vec<String>,

    /// Return type name (`None` = no value)
    #[serde(default)]
    pub returns: Option<String>,

    #[serde(default)]
    pub body: Vec<Instruction>,
}

impl FunctionDecl {
    /// Public module-level function with an empty body
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: Access::public_static(),
            params: Vec::new(),
            returns: None,
            body: Vec::new(),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_param(mut self, ty: impl Into<String>) -> Self {
        self.params.push(ty.into());
        self
    }

    pub fn with_returns(mut self, ty: impl Into<String>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn with_body(mut self, body: Vec<Instruction>) -> Self {
        self.body = body;
        self
    }

    /// Module-level and parameterless
    pub fn is_parameterless_static(&self) -> bool {
        self.access.is_static && self.params.is_empty()
    }
}

// ============================================================================
// Metadata tags
// ============================================================================

/// Declarative marker embedded in a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTag {
    pub descriptor: String,

    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl MetadataTag {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// UnitImage
// ============================================================================

/// Decoded form of a compiled unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitImage {
    /// Dotted unit name
    pub name: String,

    #[serde(default)]
    pub tags: Vec<MetadataTag>,

    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
}

impl UnitImage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn with_tag(mut self, descriptor: impl Into<String>) -> Self {
        self.tags.push(MetadataTag::new(descriptor));
        self
    }

    pub fn with_metadata(mut self, tag: MetadataTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    /// Whether a tag with exactly this descriptor is present
    pub fn has_tag(&self, descriptor: &str) -> bool {
        self.tags.iter().any(|t| t.descriptor == descriptor)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Serialize with header
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)?;
        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(&UNIT_MAGIC);
        out.extend_from_slice(&UNIT_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parse bytes produced by [`UnitImage::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::format(format!("{} bytes is shorter than the header", bytes.len())));
        }
        if bytes[..UNIT_MAGIC.len()] != UNIT_MAGIC {
            return Err(Error::format("bad magic"));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != UNIT_FORMAT_VERSION {
            return Err(Error::format(format!("unsupported format version {}", version)));
        }

        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| Error::format(e.to_string()))
    }
}

// ============================================================================
// Name <-> archive path
// ============================================================================

/// `a/b/C.unit` -> `a.b.C`; `None` for non-unit entries
pub fn unit_name_from_path(path: &str) -> Option<String> {
    let stem = path.strip_suffix(UNIT_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.trim_start_matches('/').replace('/', "."))
}

/// `a.b.C` -> `a/b/C.unit`
pub fn unit_path_for_name(name: &str) -> String {
    format!("{}{}", name.replace('.', "/"), UNIT_SUFFIX)
}
