use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

// ---------------------------------------------------------------------------
// Token types (internal, not serialized to JSON output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Module,
    Model,
    Section,
    Member,
    Blockquote,
    Blank,
    Text,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub raw: String,
    pub line: usize,
    pub indent: usize,
    pub data: TokenData,
}

#[derive(Debug, Clone, Default)]
pub struct TokenData {
    // Module / Model / Section
    pub name: Option<String>,
    pub description: Option<String>,

    // Model heading
    pub extends: Vec<String>,

    // Member
    pub params: Option<Vec<String>>,
    pub kind_text: Option<String>,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Declarations (serialized to JSON, consumed read-only by the engine)
// ---------------------------------------------------------------------------

/// Semantic kind of a model field.
///
/// Relational kinds carry the name of the model they point at (the comodel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "comodel")]
pub enum FieldKind {
    Boolean,
    Integer,
    Float,
    Monetary,
    Char,
    Text,
    Date,
    Datetime,
    Selection,
    Many2one(String),
    One2many(String),
    Many2many(String),
    /// Kind text the parser did not recognise, preserved verbatim.
    Unknown(String),
}

impl FieldKind {
    /// Model referenced by a relational field, if any.
    pub fn comodel(&self) -> Option<&str> {
        match self {
            FieldKind::Many2one(m) | FieldKind::One2many(m) | FieldKind::Many2many(m) => {
                Some(m.as_str())
            }
            _ => None,
        }
    }

    pub fn is_relational(&self) -> bool {
        self.comodel().is_some()
    }

    pub fn is_to_many(&self) -> bool {
        matches!(self, FieldKind::One2many(_) | FieldKind::Many2many(_))
    }

    /// Source spelling of the kind, e.g. `Many2one(res.partner)`.
    pub fn display(&self) -> String {
        match self {
            FieldKind::Boolean => "Boolean".into(),
            FieldKind::Integer => "Integer".into(),
            FieldKind::Float => "Float".into(),
            FieldKind::Monetary => "Monetary".into(),
            FieldKind::Char => "Char".into(),
            FieldKind::Text => "Text".into(),
            FieldKind::Date => "Date".into(),
            FieldKind::Datetime => "Datetime".into(),
            FieldKind::Selection => "Selection".into(),
            FieldKind::Many2one(m) => format!("Many2one({m})"),
            FieldKind::One2many(m) => format!("One2many({m})"),
            FieldKind::Many2many(m) => format!("Many2many({m})"),
            FieldKind::Unknown(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "lowercase")]
pub enum MemberKind {
    Field { kind: FieldKind },
    Method { params: Vec<String> },
}

/// A field or callable declared locally in one [`Declaration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(flatten)]
    pub kind: MemberKind,
    pub loc: SourceLocation,
}

impl Member {
    pub fn field_kind(&self) -> Option<&FieldKind> {
        match &self.kind {
            MemberKind::Field { kind } => Some(kind),
            MemberKind::Method { .. } => None,
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }
}

/// Delegated model exposed through a local Many2one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub model: String,
    pub field: String,
}

/// One class-like source construct contributing to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declared model name; `None` means the construct is not a model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub extends: Vec<String>,
    pub delegates: Vec<Delegation>,
    pub members: Vec<Member>,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub loc: SourceLocation,
}

impl Declaration {
    /// Locally declared member by name. The last declaration of a name wins.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().rev().find(|m| m.name == name)
    }
}

/// Result of parsing a single declaration source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedModule {
    pub module: String,
    pub source: String,
    pub declarations: Vec<Declaration>,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: DiagnosticSeverity,
    pub file: String,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}
