use regex::Regex;
use std::sync::LazyLock;

use crate::types::*;

// --- Regex patterns ---

static RE_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^# (.+)$").unwrap());
static RE_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^## (.+)$").unwrap());
static RE_H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^### (.+)$").unwrap());
static RE_BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)> (.+)$").unwrap());
static RE_LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)- (.+)$").unwrap());
static RE_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").unwrap());

static RE_MODULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Module:\s*(.+)$").unwrap());

// H2: `name`, `name : a, b`, `: a`
static RE_MODEL_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w][\w.]*)?\s*(?::\s*(.*?))?\s*$").unwrap());

// Member line: `name: Kind(arg)` or `name(params)`
static RE_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w][\w.]*)(?:\(([^)]*)\))?\s*(?::\s*(.+?))?\s*$").unwrap()
});
static RE_INLINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+#\s+(.+)$").unwrap());

/// Tokenize declaration markdown into a sequence of tokens.
pub fn lex(content: &str, _file: &str) -> Vec<Token> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut tokens: Vec<Token> = Vec::new();
    let total = lines.len();
    let mut i = 0;

    while i < total {
        let raw_line = lines[i];
        // Strip trailing \r for CRLF
        let raw = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let line_num = i + 1;

        // Fenced code blocks carry no declarations
        if raw.trim_start().starts_with("```") {
            i += 1;
            while i < total && !lines[i].trim_start().starts_with("```") {
                i += 1;
            }
            i += 1;
            continue;
        }

        tokens.push(tokenize_line(raw, line_num));
        i += 1;
    }

    tokens
}

fn tokenize_line(raw: &str, line: usize) -> Token {
    let token = |token_type: TokenType, indent: usize, data: TokenData| Token {
        token_type,
        raw: raw.to_string(),
        line,
        indent,
        data,
    };

    if RE_BLANK.is_match(raw) {
        return token(TokenType::Blank, 0, TokenData::default());
    }

    // H3 before H2 before H1: the shorter prefixes match the longer headings
    if let Some(caps) = RE_H3.captures(raw) {
        let data = TokenData {
            name: Some(caps[1].trim().to_string()),
            ..Default::default()
        };
        return token(TokenType::Section, 0, data);
    }

    if let Some(caps) = RE_H2.captures(raw) {
        return token(TokenType::Model, 0, lex_model_heading(caps[1].trim()));
    }

    if let Some(caps) = RE_H1.captures(raw) {
        let content = caps[1].trim();
        let name = RE_MODULE
            .captures(content)
            .map(|c| c[1].trim().to_string());
        return match name {
            Some(name) => token(
                TokenType::Module,
                0,
                TokenData {
                    name: Some(name),
                    ..Default::default()
                },
            ),
            None => token(TokenType::Text, 0, TokenData::default()),
        };
    }

    if let Some(caps) = RE_BLOCKQUOTE.captures(raw) {
        let data = TokenData {
            description: Some(caps[2].trim().to_string()),
            ..Default::default()
        };
        return token(TokenType::Blockquote, caps[1].len(), data);
    }

    if let Some(caps) = RE_LIST_ITEM.captures(raw) {
        let indent = caps[1].len();
        return match lex_member(caps[2].trim()) {
            Some(data) => token(TokenType::Member, indent, data),
            None => token(TokenType::Text, indent, TokenData::default()),
        };
    }

    token(TokenType::Text, 0, TokenData::default())
}

fn lex_model_heading(content: &str) -> TokenData {
    let mut data = TokenData::default();
    let Some(caps) = RE_MODEL_DEF.captures(content) else {
        return data;
    };

    data.name = caps.get(1).map(|m| m.as_str().to_string());
    if let Some(parents) = caps.get(2) {
        data.extends = parents
            .as_str()
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    data
}

fn lex_member(content: &str) -> Option<TokenData> {
    let mut body = content.to_string();
    let mut comment = None;
    if let Some(caps) = RE_INLINE_COMMENT.captures(content) {
        comment = Some(caps[1].trim().to_string());
        let start = caps.get(0).map_or(content.len(), |m| m.start());
        body = content[..start].to_string();
    }

    let caps = RE_MEMBER.captures(body.trim())?;
    let params = caps.get(2).map(|p| {
        p.as_str()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
    });

    Some(TokenData {
        name: Some(caps[1].to_string()),
        params,
        kind_text: caps.get(3).map(|k| k.as_str().trim().to_string()),
        comment,
        ..Default::default()
    })
}
