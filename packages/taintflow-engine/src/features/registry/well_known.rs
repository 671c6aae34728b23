//! Built-in classification tables
//!
//! Each entry is guarded by the metadata name of its anchor type: the
//! builder adds it only when the compilation actually contains that type,
//! so a compilation without, say, `System.Web` simply gets no web-input
//! sources instead of an error.

use super::model::{SinkKind, SourceKind};
use once_cell::sync::Lazy;

/// Attribute marking return values / out parameters that callers must
/// consume
pub const DO_NOT_IGNORE_ATTRIBUTE: &str =
    "System.Diagnostics.CodeAnalysis.DoNotIgnoreAttribute";

pub(super) struct SourceSpec {
    pub type_name: &'static str,
    pub member: &'static str,
    pub kind: SourceKind,
}

pub(super) struct SinkSpec {
    pub type_name: &'static str,
    pub method: &'static str,
    pub kind: SinkKind,
    pub vulnerable_parameters: &'static [usize],
}

pub(super) struct SanitizerSpec {
    pub type_name: &'static str,
    pub is_interface: bool,
    pub is_constructor_sanitizing: bool,
    pub methods: &'static [&'static str],
}

pub(super) static WELL_KNOWN_SOURCES: Lazy<Vec<SourceSpec>> = Lazy::new(|| {
    vec![
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "Form",
            kind: SourceKind::Property,
        },
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "QueryString",
            kind: SourceKind::Property,
        },
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "Cookies",
            kind: SourceKind::Property,
        },
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "Params",
            kind: SourceKind::Property,
        },
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "RawUrl",
            kind: SourceKind::Property,
        },
        SourceSpec {
            type_name: "System.Web.HttpRequest",
            member: "",
            kind: SourceKind::Parameter,
        },
        SourceSpec {
            type_name: "System.Console",
            member: "ReadLine",
            kind: SourceKind::Method,
        },
        SourceSpec {
            type_name: "System.Environment",
            member: "GetEnvironmentVariable",
            kind: SourceKind::Method,
        },
        SourceSpec {
            type_name: "System.IO.TextReader",
            member: "ReadToEnd",
            kind: SourceKind::Method,
        },
    ]
});

pub(super) static WELL_KNOWN_SINKS: Lazy<Vec<SinkSpec>> = Lazy::new(|| {
    vec![
        SinkSpec {
            type_name: "System.Data.SqlClient.SqlCommand",
            method: ".ctor",
            kind: SinkKind::Sql,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.Data.SqlClient.SqlCommand",
            method: "CommandText",
            kind: SinkKind::Sql,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.DirectoryServices.DirectorySearcher",
            method: "Filter",
            kind: SinkKind::Ldap,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.DirectoryServices.DirectorySearcher",
            method: ".ctor",
            kind: SinkKind::Ldap,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.Web.HttpResponse",
            method: "Write",
            kind: SinkKind::Xss,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.Web.HttpResponse",
            method: "Redirect",
            kind: SinkKind::Redirect,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.Diagnostics.Process",
            method: "Start",
            kind: SinkKind::ProcessCommand,
            vulnerable_parameters: &[],
        },
        SinkSpec {
            type_name: "System.IO.File",
            method: "Open",
            kind: SinkKind::FilePath,
            vulnerable_parameters: &[0],
        },
        SinkSpec {
            type_name: "System.IO.File",
            method: "ReadAllText",
            kind: SinkKind::FilePath,
            vulnerable_parameters: &[0],
        },
    ]
});

pub(super) static WELL_KNOWN_SANITIZERS: Lazy<Vec<SanitizerSpec>> = Lazy::new(|| {
    vec![
        SanitizerSpec {
            type_name: "Microsoft.Security.Application.Encoder",
            is_interface: false,
            is_constructor_sanitizing: false,
            methods: &[
                "LdapDistinguishedNameEncode",
                "LdapEncode",
                "LdapFilterEncode",
                "HtmlEncode",
                "UrlEncode",
            ],
        },
        SanitizerSpec {
            type_name: "System.Web.Security.AntiXss.AntiXssEncoder",
            is_interface: false,
            is_constructor_sanitizing: false,
            methods: &["HtmlEncode", "HtmlAttributeEncode", "UrlEncode", "XmlEncode"],
        },
        // Wrapping a value in a parameter object makes the query
        // parameterized; the constructed instance is safe wherever it flows.
        SanitizerSpec {
            type_name: "System.Data.SqlClient.SqlParameter",
            is_interface: false,
            is_constructor_sanitizing: true,
            methods: &[],
        },
    ]
});
