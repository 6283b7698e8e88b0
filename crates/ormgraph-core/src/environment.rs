//! Types of the environment handle and of record-set re-binding calls.

use std::sync::Arc;

use crate::catalogs::{BROWSE_VARIANTS, RES_USERS, USER};
use crate::error::Result;
use crate::model_type::{ModelType, ValueType};
use crate::project::Project;
use crate::record_set::RecordSetVariant;

/// Type of `env[model]`.
pub fn env_model(project: &Project, model: &str) -> Result<Arc<ModelType>> {
    project.model_type(model, RecordSetVariant::Unbound)
}

/// Type of `env.user`.
pub fn env_user(project: &Project) -> Result<Arc<ModelType>> {
    project.model_type(RES_USERS, RecordSetVariant::Singleton)
}

/// Type of a named attribute of the environment handle, if it has one.
pub fn env_attribute(project: &Project, name: &str) -> Result<Option<ValueType>> {
    match name {
        USER => Ok(Some(ValueType::Model(env_user(project)?))),
        _ => Ok(None),
    }
}

pub fn is_rebinding_call(method: &str) -> bool {
    BROWSE_VARIANTS.contains(&method)
}

impl ModelType {
    /// Result type of a re-binding call (`browse`, `sudo`, ...) made on this
    /// type. Absent for any other method name.
    pub fn call_result(&self, method: &str) -> Result<Option<Arc<ModelType>>> {
        self.assert_valid()?;
        self.variant()
            .rebind(method)
            .map(|variant| self.class().model_type(variant))
            .transpose()
    }
}
