use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::catalogs::{DELEGATES_SECTION, RELATIONAL_FIELD_KINDS, SCALAR_FIELD_KINDS};
use crate::lexer::lex;
use crate::types::*;

static RE_KIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)(?:\(\s*([\w.]+)\s*\))?$").unwrap());

// --- Parser state ---

struct ParserState {
    file: String,
    module: Option<String>,
    current: Option<Declaration>,
    current_section: Option<String>,
    declarations: Vec<Declaration>,
}

/// Parse declaration source text into a ParsedModule.
pub fn parse_string(content: &str, file: &str) -> ParsedModule {
    let tokens = lex(content, file);
    parse_tokens(&tokens, file)
}

/// Parse a token sequence into a ParsedModule.
pub fn parse_tokens(tokens: &[Token], file: &str) -> ParsedModule {
    let mut state = ParserState {
        file: file.to_string(),
        module: None,
        current: None,
        current_section: None,
        declarations: Vec::new(),
    };

    for token in tokens {
        process_token(token, &mut state);
    }
    finish_declaration(&mut state);

    let module = state
        .module
        .unwrap_or_else(|| module_name_from_path(file));
    for decl in state.declarations.iter_mut() {
        decl.module = module.clone();
    }

    ParsedModule {
        module,
        source: state.file,
        declarations: state.declarations,
    }
}

/// Module name derived from a source path: the file name without its
/// `.models.md` / `.models.json` / `.md` suffix.
pub fn module_name_from_path(file: &str) -> String {
    let name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());
    for suffix in [".models.md", ".models.json", ".md"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    name
}

/// Parse the kind text of a field line, e.g. `Char` or `Many2one(res.partner)`.
pub fn parse_field_kind(text: &str) -> FieldKind {
    let text = text.trim();
    let Some(caps) = RE_KIND.captures(text) else {
        return FieldKind::Unknown(text.to_string());
    };
    let name = &caps[1];
    let arg = caps.get(2).map(|a| a.as_str().to_string());

    if SCALAR_FIELD_KINDS.contains(name) {
        return match name {
            "Boolean" => FieldKind::Boolean,
            "Integer" => FieldKind::Integer,
            "Float" => FieldKind::Float,
            "Monetary" => FieldKind::Monetary,
            "Char" => FieldKind::Char,
            "Text" => FieldKind::Text,
            "Date" => FieldKind::Date,
            "Datetime" => FieldKind::Datetime,
            _ => FieldKind::Selection,
        };
    }

    match (RELATIONAL_FIELD_KINDS.contains(name), arg) {
        (true, Some(comodel)) => match name {
            "Many2one" => FieldKind::Many2one(comodel),
            "One2many" => FieldKind::One2many(comodel),
            _ => FieldKind::Many2many(comodel),
        },
        _ => FieldKind::Unknown(text.to_string()),
    }
}

fn process_token(token: &Token, state: &mut ParserState) {
    match token.token_type {
        TokenType::Module => {
            if let Some(ref name) = token.data.name {
                state.module = Some(name.clone());
            }
        }
        TokenType::Model => {
            finish_declaration(state);
            start_declaration(token, state);
        }
        TokenType::Section => {
            state.current_section = token.data.name.clone();
        }
        TokenType::Blockquote => {
            if let Some(ref mut decl) = state.current {
                if decl.members.is_empty() && decl.description.is_none() {
                    decl.description = token.data.description.clone();
                }
            }
        }
        TokenType::Member => process_member(token, state),
        TokenType::Blank | TokenType::Text => {}
    }
}

fn start_declaration(token: &Token, state: &mut ParserState) {
    let extends = token.data.extends.clone();
    // A nameless declaration extending exactly one model contributes to it
    let model = match (&token.data.name, extends.as_slice()) {
        (Some(name), _) => Some(name.clone()),
        (None, [single]) => Some(single.clone()),
        (None, _) => None,
    };

    state.current = Some(Declaration {
        model,
        extends,
        delegates: Vec::new(),
        members: Vec::new(),
        module: String::new(),
        description: None,
        loc: SourceLocation {
            file: state.file.clone(),
            line: token.line,
            col: 1,
        },
    });
    state.current_section = None;
}

fn finish_declaration(state: &mut ParserState) {
    if let Some(decl) = state.current.take() {
        state.declarations.push(decl);
    }
}

fn process_member(token: &Token, state: &mut ParserState) {
    // Nested list items have no meaning in declaration sources
    if token.indent > 0 {
        return;
    }
    let Some(ref mut decl) = state.current else {
        return;
    };
    let Some(ref name) = token.data.name else {
        return;
    };

    match state.current_section.as_deref() {
        Some(DELEGATES_SECTION) => {
            if let Some(ref field) = token.data.kind_text {
                decl.delegates.push(Delegation {
                    model: name.clone(),
                    field: field.clone(),
                });
            }
        }
        Some(_) => {}
        None => {
            let kind = match (&token.data.kind_text, &token.data.params) {
                (Some(kind_text), _) => MemberKind::Field {
                    kind: parse_field_kind(kind_text),
                },
                (None, Some(params)) => MemberKind::Method {
                    params: params.clone(),
                },
                (None, None) => MemberKind::Field {
                    kind: FieldKind::Unknown(String::new()),
                },
            };
            decl.members.push(Member {
                name: name.clone(),
                kind,
                loc: SourceLocation {
                    file: state.file.clone(),
                    line: token.line,
                    col: token.indent + 3,
                },
            });
        }
    }
}
