//! Operations and operand references
//!
//! Field and array accesses are operand shapes rather than separate
//! operation kinds: a read flows through the value side of an `Assign` or an
//! `Invoke` argument, a write through the target side of an `Assign`. The
//! entity model resolves the shapes into storage-location identities.

use crate::shared::models::{BodyId, Span};
use serde::{Deserialize, Serialize};

/// Reference to a storage location or value as it appears in an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Local variable by name
    Local(String),

    /// Parameter by position and name
    Parameter { index: usize, name: String },

    /// The receiver of the enclosing body
    ThisReference,

    /// Field access chain: `base.name`
    Field { base: Box<Operand>, name: String },

    /// Array element access; the index expression is abstracted away, so
    /// all elements of one array collapse to a single representative
    ArrayIndex { base: Box<Operand> },

    /// Indexer (property-element) access, same collapsing as arrays
    PropertyIndex { base: Box<Operand> },

    /// Compile-time constant; proven safe by construction
    Literal,

    /// The `_` discard target; writes to it are an intentional no-op
    Discarded,

    /// An operand shape the front end could not express; always treated
    /// as Unknown, never as an error
    Opaque,
}

impl Operand {
    pub fn local(name: impl Into<String>) -> Self {
        Operand::Local(name.into())
    }

    pub fn parameter(index: usize, name: impl Into<String>) -> Self {
        Operand::Parameter {
            index,
            name: name.into(),
        }
    }

    pub fn field(base: Operand, name: impl Into<String>) -> Self {
        Operand::Field {
            base: Box::new(base),
            name: name.into(),
        }
    }

    pub fn array_index(base: Operand) -> Self {
        Operand::ArrayIndex {
            base: Box::new(base),
        }
    }

    pub fn property_index(base: Operand) -> Self {
        Operand::PropertyIndex {
            base: Box::new(base),
        }
    }
}

/// How an argument is bound at a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentKind {
    /// Passed by value; the callee cannot write back
    ByValue,

    /// `out`-style binding; the callee writes the operand on return
    Out,
}

/// One call-site argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub value: Operand,
    pub kind: ArgumentKind,
}

impl Argument {
    pub fn by_value(value: Operand) -> Self {
        Self {
            value,
            kind: ArgumentKind::ByValue,
        }
    }

    pub fn out(target: Operand) -> Self {
        Self {
            value: target,
            kind: ArgumentKind::Out,
        }
    }
}

/// Call target as the front end resolved it
///
/// `body` is present when the callee is defined in the same compilation and
/// its CFG can be obtained from the session's `BodyProvider`; external
/// callees have `body: None` and summarize conservatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callee {
    /// Metadata name of the declaring type, e.g. `System.Web.HttpRequest`
    pub type_name: String,

    /// Member name; property getters arrive as the property name
    pub method_name: String,

    /// True for constructor invocations
    pub is_constructor: bool,

    /// Body id when the callee is analyzable
    pub body: Option<BodyId>,
}

impl Callee {
    pub fn external(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            is_constructor: false,
            body: None,
        }
    }

    pub fn constructor(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: ".ctor".to_string(),
            is_constructor: true,
            body: None,
        }
    }

    pub fn with_body(mut self, body: BodyId) -> Self {
        self.body = Some(body);
        self
    }
}

/// One operation inside a basic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// `target = value`; assignment replaces the target's abstract value
    Assign {
        target: Operand,
        value: Operand,
        span: Span,
    },

    /// Call; `result` is the binding the return value flows into, `None`
    /// when the call is an expression statement whose value is unused
    Invoke {
        callee: Callee,
        receiver: Option<Operand>,
        args: Vec<Argument>,
        result: Option<Operand>,
        span: Span,
    },

    /// Conditional branch; no value change, edges carry the split
    Branch { condition: Operand, span: Span },

    /// Return from the body
    Return { value: Option<Operand>, span: Span },

    /// Explicit discard of a value (`_ = expr`); a recognized no-op that
    /// suppresses taint propagation and consumption findings
    Discard { value: Operand, span: Span },
}

impl Operation {
    pub fn span(&self) -> Span {
        match self {
            Operation::Assign { span, .. }
            | Operation::Invoke { span, .. }
            | Operation::Branch { span, .. }
            | Operation::Return { span, .. }
            | Operation::Discard { span, .. } => *span,
        }
    }
}
