//! Classification records and lookup tables

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance tag: index of a `SourceInfo` within the owning `Registries`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SourceId(pub u16);

/// What kind of member introduces the tainted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Property read (arrives lowered as a getter invocation)
    Property,
    /// Ordinary method return value
    Method,
    /// Any parameter of the given type entering an analyzed body
    Parameter,
}

/// A member whose value must be treated as tainted until proven otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: SourceId,
    /// Metadata name of the declaring type (or the parameter type for
    /// `SourceKind::Parameter` entries)
    pub type_name: String,
    /// Member name; empty for parameter sources
    pub member: String,
    pub kind: SourceKind,
}

impl SourceInfo {
    /// Short display name for findings, e.g. `HttpRequest.Form`
    pub fn display_name(&self) -> String {
        let type_short = self.type_name.rsplit('.').next().unwrap_or(&self.type_name);
        if self.member.is_empty() {
            type_short.to_string()
        } else {
            format!("{}.{}", type_short, self.member)
        }
    }
}

/// Vulnerability class of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SinkKind {
    Sql,
    Ldap,
    Xss,
    ProcessCommand,
    FilePath,
    Redirect,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkKind::Sql => "sql-injection",
            SinkKind::Ldap => "ldap-injection",
            SinkKind::Xss => "xss",
            SinkKind::ProcessCommand => "command-injection",
            SinkKind::FilePath => "path-traversal",
            SinkKind::Redirect => "open-redirect",
        };
        write!(f, "{}", name)
    }
}

/// A method whose listed parameter positions must not receive tainted values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkInfo {
    pub type_name: String,
    pub method: String,
    pub kind: SinkKind,
    /// Vulnerable parameter positions; empty means every position
    pub vulnerable_parameters: Vec<usize>,
}

impl SinkInfo {
    pub fn is_vulnerable(&self, position: usize) -> bool {
        self.vulnerable_parameters.is_empty() || self.vulnerable_parameters.contains(&position)
    }
}

/// Effect of one sanitizing call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizingEffect {
    /// The return value is proven not tainted
    pub sanitizes_return: bool,
    /// Argument positions whose entities are forced not-tainted in place
    pub sanitized_arguments: Vec<usize>,
}

impl SanitizingEffect {
    pub fn return_value() -> Self {
        Self {
            sanitizes_return: true,
            sanitized_arguments: Vec::new(),
        }
    }
}

/// Sanitizer description for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerInfo {
    pub type_name: String,
    pub is_interface: bool,
    /// Instances built through this type's constructor are sanitized
    /// producers: the construction result and every instance method return
    /// is not tainted
    pub is_constructor_sanitizing: bool,
    /// Named sanitizing methods with their effects
    pub methods: FxHashMap<String, SanitizingEffect>,
}

impl SanitizerInfo {
    pub fn effect_of(&self, method: &str) -> Option<SanitizingEffect> {
        if let Some(effect) = self.methods.get(method) {
            return Some(effect.clone());
        }
        if self.is_constructor_sanitizing {
            // Any instance method of a constructor-sanitizing type
            return Some(SanitizingEffect::return_value());
        }
        None
    }
}

/// A member whose returned / out value must be consumed by callers
///
/// Built from `DoNotIgnore` attribute metadata; the optional message is the
/// attribute's `Message` named argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MustUseInfo {
    pub type_name: String,
    pub member: String,
    pub message: Option<String>,
}

/// A classification entry skipped during registry construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryWarning {
    pub entry: String,
    pub reason: String,
}

/// Immutable classification tables, shared by reference across concurrently
/// analyzed bodies
#[derive(Debug, Default)]
pub struct Registries {
    pub(super) sources: Vec<SourceInfo>,
    pub(super) source_index: FxHashMap<(String, String), SourceId>,
    pub(super) parameter_sources: FxHashMap<String, SourceId>,
    pub(super) sinks: FxHashMap<(String, String), SinkInfo>,
    pub(super) sanitizers: FxHashMap<String, SanitizerInfo>,
    pub(super) must_use: FxHashMap<(String, String), MustUseInfo>,
    pub(super) warnings: Vec<RegistryWarning>,
}

impl Registries {
    /// Registry with every category empty; analysis produces no findings
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn classify_source(&self, type_name: &str, member: &str) -> Option<&SourceInfo> {
        let id = self
            .source_index
            .get(&(type_name.to_string(), member.to_string()))?;
        Some(&self.sources[id.0 as usize])
    }

    /// Source classification for a parameter of the given type
    pub fn classify_parameter_source(&self, param_type: &str) -> Option<SourceId> {
        self.parameter_sources.get(param_type).copied()
    }

    pub fn classify_sink(&self, type_name: &str, method: &str) -> Option<&SinkInfo> {
        self.sinks.get(&(type_name.to_string(), method.to_string()))
    }

    /// Sanitizing effect of invoking `type_name::method`, if any
    pub fn classify_sanitizer(&self, type_name: &str, method: &str) -> Option<SanitizingEffect> {
        self.sanitizers.get(type_name)?.effect_of(method)
    }

    /// True when constructing `type_name` yields a sanitized value
    pub fn classify_constructor(&self, type_name: &str) -> bool {
        self.sanitizers
            .get(type_name)
            .map(|s| s.is_constructor_sanitizing)
            .unwrap_or(false)
    }

    pub fn classify_must_use(&self, type_name: &str, member: &str) -> Option<&MustUseInfo> {
        self.must_use
            .get(&(type_name.to_string(), member.to_string()))
    }

    pub fn source_info(&self, id: SourceId) -> &SourceInfo {
        &self.sources[id.0 as usize]
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn sanitizer_count(&self) -> usize {
        self.sanitizers.len()
    }

    /// Entries skipped during construction (malformed metadata)
    pub fn warnings(&self) -> &[RegistryWarning] {
        &self.warnings
    }

    /// True when no category has any entries
    pub fn is_noop(&self) -> bool {
        self.sources.is_empty()
            && self.sinks.is_empty()
            && self.sanitizers.is_empty()
            && self.must_use.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_empty_positions_means_all() {
        let sink = SinkInfo {
            type_name: "T".into(),
            method: "M".into(),
            kind: SinkKind::Sql,
            vulnerable_parameters: Vec::new(),
        };
        assert!(sink.is_vulnerable(0));
        assert!(sink.is_vulnerable(7));

        let scoped = SinkInfo {
            vulnerable_parameters: vec![1],
            ..sink
        };
        assert!(!scoped.is_vulnerable(0));
        assert!(scoped.is_vulnerable(1));
    }

    #[test]
    fn test_constructor_sanitizing_covers_all_methods() {
        let info = SanitizerInfo {
            type_name: "T".into(),
            is_interface: false,
            is_constructor_sanitizing: true,
            methods: FxHashMap::default(),
        };
        let effect = info.effect_of("anything").unwrap();
        assert!(effect.sanitizes_return);
    }

    #[test]
    fn test_source_display_name() {
        let info = SourceInfo {
            id: SourceId(0),
            type_name: "System.Web.HttpRequest".into(),
            member: "Form".into(),
            kind: SourceKind::Property,
        };
        assert_eq!(info.display_name(), "HttpRequest.Form");
    }

    #[test]
    fn test_empty_registry_is_noop() {
        assert!(Registries::empty().is_noop());
    }
}
