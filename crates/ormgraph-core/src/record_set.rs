//! Cardinality / binding state of a model-typed expression.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalogs::{BROWSE, SUDO, WITH_CONTEXT, WITH_ENV};

/// How a model-typed value is bound to records.
///
/// The tags are incomparable; there is no ordering of "recordness".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSetVariant {
    /// The model class itself, not bound to any record.
    Definition,
    /// Model reached through an environment handle, no record identity.
    Unbound,
    /// Exactly one record.
    Singleton,
    /// Zero or more records.
    Collection,
}

impl RecordSetVariant {
    pub const ALL: [RecordSetVariant; 4] = [
        RecordSetVariant::Definition,
        RecordSetVariant::Unbound,
        RecordSetVariant::Singleton,
        RecordSetVariant::Collection,
    ];

    pub fn is_definition(self) -> bool {
        matches!(self, RecordSetVariant::Definition)
    }

    pub fn to_instance(self) -> RecordSetVariant {
        match self {
            RecordSetVariant::Definition => RecordSetVariant::Unbound,
            RecordSetVariant::Unbound
            | RecordSetVariant::Singleton
            | RecordSetVariant::Collection => self,
        }
    }

    pub fn to_class(self) -> RecordSetVariant {
        match self {
            RecordSetVariant::Definition
            | RecordSetVariant::Unbound
            | RecordSetVariant::Singleton
            | RecordSetVariant::Collection => RecordSetVariant::Definition,
        }
    }

    /// Variant of the items produced by iterating a value of this variant.
    pub fn iterated_item(self) -> Option<RecordSetVariant> {
        match self {
            RecordSetVariant::Definition => None,
            RecordSetVariant::Unbound
            | RecordSetVariant::Singleton
            | RecordSetVariant::Collection => Some(RecordSetVariant::Singleton),
        }
    }

    /// Variant returned by a record-set re-binding call such as `browse`.
    pub fn rebind(self, method: &str) -> Option<RecordSetVariant> {
        match method {
            BROWSE => Some(RecordSetVariant::Collection),
            WITH_CONTEXT | WITH_ENV | SUDO => Some(self.to_instance()),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordSetVariant::Definition => "definition",
            RecordSetVariant::Unbound => "unbound",
            RecordSetVariant::Singleton => "singleton",
            RecordSetVariant::Collection => "collection",
        }
    }
}

impl fmt::Display for RecordSetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record set variant \"{0}\" (expected definition, unbound, singleton or collection)")]
pub struct ParseVariantError(pub String);

impl FromStr for RecordSetVariant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordSetVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVariantError(s.to_string()))
    }
}
