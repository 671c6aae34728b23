//! Registry construction
//!
//! `build_registries` assembles the session's tables from two inputs: the
//! built-in well-known tables (filtered by which anchor types the
//! compilation actually contains) and attribute metadata rows supplied by
//! the front end. Construction never fails: a missing type degrades to an
//! empty category, a malformed row is skipped with a recorded warning.

use super::model::{
    MustUseInfo, Registries, RegistryWarning, SanitizerInfo, SanitizingEffect, SinkInfo, SinkKind,
    SourceId, SourceInfo, SourceKind,
};
use super::well_known::{
    DO_NOT_IGNORE_ATTRIBUTE, WELL_KNOWN_SANITIZERS, WELL_KNOWN_SINKS, WELL_KNOWN_SOURCES,
};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Attribute argument value as the front end decoded it
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArgument {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// One attribute application reported by the front end
#[derive(Debug, Clone)]
pub struct AttributeRow {
    /// Metadata name of the attribute class
    pub attribute: String,
    /// Declaring type of the annotated member
    pub type_name: String,
    /// Annotated member name
    pub member: String,
    /// Named arguments in declaration order
    pub arguments: Vec<(String, AttributeArgument)>,
}

/// Type and attribute queries answered by the front end
pub trait CompilationTypes {
    /// Does the compilation contain a type with this metadata name?
    fn contains_type(&self, metadata_name: &str) -> bool;

    /// Attribute applications relevant to classification
    fn attribute_rows(&self) -> Vec<AttributeRow>;
}

/// Resolver for compilations with no queryable metadata; yields the no-op
/// registry
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompilationTypes;

impl CompilationTypes for NoCompilationTypes {
    fn contains_type(&self, _metadata_name: &str) -> bool {
        false
    }

    fn attribute_rows(&self) -> Vec<AttributeRow> {
        Vec::new()
    }
}

/// Incremental registry construction for custom rule sets
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registries: Registries,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(
        &mut self,
        type_name: impl Into<String>,
        member: impl Into<String>,
        kind: SourceKind,
    ) -> &mut Self {
        let type_name = type_name.into();
        let member = member.into();
        let id = SourceId(self.registries.sources.len() as u16);
        self.registries.sources.push(SourceInfo {
            id,
            type_name: type_name.clone(),
            member: member.clone(),
            kind,
        });
        match kind {
            SourceKind::Parameter => {
                self.registries.parameter_sources.insert(type_name, id);
            }
            SourceKind::Property | SourceKind::Method => {
                self.registries.source_index.insert((type_name, member), id);
            }
        }
        self
    }

    pub fn add_sink(
        &mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        kind: SinkKind,
        vulnerable_parameters: Vec<usize>,
    ) -> &mut Self {
        let type_name = type_name.into();
        let method = method.into();
        self.registries.sinks.insert(
            (type_name.clone(), method.clone()),
            SinkInfo {
                type_name,
                method,
                kind,
                vulnerable_parameters,
            },
        );
        self
    }

    pub fn add_sanitizer(
        &mut self,
        type_name: impl Into<String>,
        is_interface: bool,
        is_constructor_sanitizing: bool,
        sanitizing_methods: &[&str],
    ) -> &mut Self {
        let type_name = type_name.into();
        let mut methods = FxHashMap::default();
        for name in sanitizing_methods {
            methods.insert(name.to_string(), SanitizingEffect::return_value());
        }
        self.registries.sanitizers.insert(
            type_name.clone(),
            SanitizerInfo {
                type_name,
                is_interface,
                is_constructor_sanitizing,
                methods,
            },
        );
        self
    }

    /// Register an argument-sanitizing method (sanitizes entities at the
    /// given positions in place, in addition to its return value)
    pub fn add_sanitizer_method_effect(
        &mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        effect: SanitizingEffect,
    ) -> &mut Self {
        let type_name = type_name.into();
        let entry = self
            .registries
            .sanitizers
            .entry(type_name.clone())
            .or_insert_with(|| SanitizerInfo {
                type_name,
                is_interface: false,
                is_constructor_sanitizing: false,
                methods: FxHashMap::default(),
            });
        entry.methods.insert(method.into(), effect);
        self
    }

    pub fn add_must_use(
        &mut self,
        type_name: impl Into<String>,
        member: impl Into<String>,
        message: Option<String>,
    ) -> &mut Self {
        let type_name = type_name.into();
        let member = member.into();
        self.registries.must_use.insert(
            (type_name.clone(), member.clone()),
            MustUseInfo {
                type_name,
                member,
                message,
            },
        );
        self
    }

    fn record_warning(&mut self, entry: String, reason: String) {
        warn!(entry = %entry, reason = %reason, "skipping malformed classification entry");
        self.registries.warnings.push(RegistryWarning { entry, reason });
    }

    /// Fold one attribute row into the tables; malformed rows are skipped
    /// with a warning, never an error
    pub fn add_attribute_row(&mut self, row: &AttributeRow) -> &mut Self {
        if row.attribute != DO_NOT_IGNORE_ATTRIBUTE {
            return self;
        }
        if row.type_name.is_empty() || row.member.is_empty() {
            self.record_warning(
                format!("{}::{}", row.type_name, row.member),
                "attribute target missing type or member name".to_string(),
            );
            return self;
        }

        let mut message = None;
        for (name, value) in &row.arguments {
            if name == "Message" {
                match value {
                    AttributeArgument::Str(text) if !text.is_empty() => {
                        message = Some(text.clone());
                    }
                    AttributeArgument::Str(_) => {}
                    other => {
                        self.record_warning(
                            format!("{}::{}", row.type_name, row.member),
                            format!("Message argument has unexpected shape: {:?}", other),
                        );
                        return self;
                    }
                }
            }
        }

        self.add_must_use(row.type_name.clone(), row.member.clone(), message);
        self
    }

    pub fn build(self) -> Registries {
        self.registries
    }
}

/// Build the session registries from the compilation's metadata.
///
/// Returns an explicit no-op registry (not an error) when none of the
/// well-known anchor types are present; analysis degrades gracefully.
pub fn build_registries(types: &dyn CompilationTypes) -> Registries {
    let mut builder = RegistryBuilder::new();

    for spec in WELL_KNOWN_SOURCES.iter() {
        if types.contains_type(spec.type_name) {
            builder.add_source(spec.type_name, spec.member, spec.kind);
        }
    }

    for spec in WELL_KNOWN_SINKS.iter() {
        if types.contains_type(spec.type_name) {
            builder.add_sink(
                spec.type_name,
                spec.method,
                spec.kind,
                spec.vulnerable_parameters.to_vec(),
            );
        }
    }

    for spec in WELL_KNOWN_SANITIZERS.iter() {
        if types.contains_type(spec.type_name) {
            builder.add_sanitizer(
                spec.type_name,
                spec.is_interface,
                spec.is_constructor_sanitizing,
                spec.methods,
            );
        }
    }

    for row in types.attribute_rows() {
        builder.add_attribute_row(&row);
    }

    builder.build()
}
