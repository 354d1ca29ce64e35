//! Format - on-disk encodings
//!
//! - `unit.rs` - compiled unit image (`IGNU`)
//! - `archive.rs` - bundle archive stream (`IGNB`)

mod archive;
mod unit;

pub use archive::{
    ArchiveEntry, ArchiveReader, BundleWriter, ARCHIVE_MAGIC, ARCHIVE_VERSION, BUNDLE_EXTENSION,
};
pub use unit::{
    unit_name_from_path, unit_path_for_name, Access, FunctionDecl, Instruction, MetadataTag,
    UnitImage, Visibility, SERVICE_TAG, TRACKABLE_TAG, UNIT_FORMAT_VERSION, UNIT_MAGIC,
    UNIT_SUFFIX,
};
