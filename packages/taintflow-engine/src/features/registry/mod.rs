//! Declarative classification registries
//!
//! Sources, sanitizers, sinks, and must-consume members are described by
//! immutable records built once per analysis session from the front end's
//! type/attribute metadata. Transfer functions then classify call sites by
//! plain hashed (declaring-type, member-name) lookup: no reflection, no
//! pattern scans on the hot path.

mod builder;
mod model;
mod well_known;

pub use builder::{
    build_registries, AttributeArgument, AttributeRow, CompilationTypes, NoCompilationTypes,
    RegistryBuilder,
};
pub use model::{
    MustUseInfo, Registries, RegistryWarning, SanitizerInfo, SanitizingEffect, SinkInfo, SinkKind,
    SourceId, SourceInfo, SourceKind,
};
pub use well_known::DO_NOT_IGNORE_ATTRIBUTE;
