//! `fieldkit` core: safe item access, field controllers, the filter catalog
//! and the form engine.

pub mod accessor;
pub mod error;
pub mod fields;
pub mod filter;
pub mod form;
pub mod schema;
pub mod selection;
pub mod traits;
pub mod value;

pub use accessor::{FieldError, PathSegment, SafeAccessor};
pub use error::{AccessError, FormError};
pub use fields::{controller_for, FieldController, FieldSet, Payload};
pub use filter::{FilterController, FilterSpec, NumericEncoding, Operator, OperatorInput, QueryPredicate};
pub use form::{FormEngine, SaveOutcome, Session};
pub use schema::{FieldConfig, FieldDescriptor, FieldKind, ListSchema, ValidationResult};
pub use selection::Selection;
pub use traits::{ItemBackend, ItemResponse, Notice, Notifier, Tone, TracingNotifier};
pub use value::{EditValue, FieldValue, ValueMap};
