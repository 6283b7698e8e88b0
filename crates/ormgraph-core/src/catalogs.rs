use std::collections::HashSet;
use std::sync::LazyLock;

/// Row identifier pseudo-field, present on every model.
pub const ID: &str = "id";

/// Separator between segments of a dotted field path.
pub const PATH_SEPARATOR: char = '.';

/// Section heading that introduces the delegation map of a declaration.
pub const DELEGATES_SECTION: &str = "Delegates";

/// Environment attribute holding the current user record.
pub const USER: &str = "user";
pub const RES_USERS: &str = "res.users";

pub const BROWSE: &str = "browse";
pub const WITH_CONTEXT: &str = "with_context";
pub const WITH_ENV: &str = "with_env";
pub const SUDO: &str = "sudo";

/// Calls that re-bind a record set to a new environment or id list.
pub const BROWSE_VARIANTS: &[&str] = &[BROWSE, WITH_CONTEXT, WITH_ENV, SUDO];

/// Scalar field kinds accepted in declaration sources.
pub static SCALAR_FIELD_KINDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut s = HashSet::new();
    s.insert("Boolean");
    s.insert("Integer");
    s.insert("Float");
    s.insert("Monetary");
    s.insert("Char");
    s.insert("Text");
    s.insert("Date");
    s.insert("Datetime");
    s.insert("Selection");
    s
});

/// Relational field kinds; these take the comodel name as argument.
pub static RELATIONAL_FIELD_KINDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut s = HashSet::new();
    s.insert("Many2one");
    s.insert("One2many");
    s.insert("Many2many");
    s
});

/// Parser version constant.
pub const PARSER_VERSION: &str = "0.3.0";
