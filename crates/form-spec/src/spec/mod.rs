pub mod field;
pub mod form;

pub use field::{FieldDefinition, FieldKind, SliderConfig, SubQuestion, SubQuestionMap};
pub use form::{AccessError, FieldMap, FormDefinition};
