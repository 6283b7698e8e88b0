pub mod analyze;
pub mod complete;
pub mod inspect;
pub mod lint;
pub mod path;
