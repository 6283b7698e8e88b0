pub mod catalogs;
pub mod environment;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod model_class;
pub mod model_type;
pub mod parser;
pub mod project;
pub mod record_set;
pub mod registry;
pub mod types;
pub mod validator;

pub use catalogs::PARSER_VERSION;
pub use environment::{env_attribute, env_model, env_user, is_rebinding_call};
pub use error::{GraphError, Result};
pub use graph::{AncestorNames, EvalContext, ModelGraph};
pub use lexer::lex;
pub use model_class::{ClassChain, DelegationChild, ModelClass, Symbol};
pub use model_type::{
    BoundMethod, CompletionItem, CompletionKind, ModelType, PrimitiveType, ResolvedMember,
    ValueType,
};
pub use parser::{module_name_from_path, parse_string};
pub use project::{Project, Snapshot};
pub use record_set::{ParseVariantError, RecordSetVariant};
pub use registry::ModelRegistry;
pub use types::*;
pub use validator::{validate, validate_project};
