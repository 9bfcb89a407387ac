//! Form session engine.
//!
//! A [`FormEngine`] owns the edit state of one item: it deserializes every
//! field from the item snapshot, accepts edits, computes which fields
//! changed, validates, and saves a minimal payload through an
//! [`ItemBackend`]. It is a single-owner state machine; every mutation takes
//! `&mut self`, so a second save cannot start while one is awaiting.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::accessor::SafeAccessor;
use crate::error::FormError;
use crate::fields::{FieldController, FieldSet, Payload};
use crate::schema::ValidationResult;
use crate::traits::{ItemBackend, ItemResponse, Notice, Notifier, Tone, TracingNotifier};
use crate::value::{EditValue, FieldValue, ValueMap};

/// Whether the session edits a new or an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Create,
    Update,
}

/// Result of a save attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend accepted the change; values were reset from its response.
    Saved,
    /// Nothing changed, so no request was made.
    Unchanged,
    /// Validation failed for these paths; no request was made.
    Invalid(BTreeSet<String>),
}

pub struct FormEngine {
    list_key: String,
    fields: Arc<FieldSet>,
    session: Session,
    item: SafeAccessor,
    initial: ValueMap,
    values: ValueMap,
    loading: bool,
    error: Option<FormError>,
    force_validation: bool,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("list_key", &self.list_key)
            .field("session", &self.session)
            .field("values", &self.values)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("force_validation", &self.force_validation)
            .finish_non_exhaustive()
    }
}

impl FormEngine {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Starts editing an existing item.
    #[must_use]
    pub fn update(list_key: impl Into<String>, fields: Arc<FieldSet>, item: SafeAccessor) -> Self {
        Self::new(list_key.into(), fields, Session::Update, item)
    }

    /// Starts a session for a new item, seeded with default values.
    #[must_use]
    pub fn create(list_key: impl Into<String>, fields: Arc<FieldSet>) -> Self {
        Self::new(list_key.into(), fields, Session::Create, SafeAccessor::null())
    }

    fn new(list_key: String, fields: Arc<FieldSet>, session: Session, item: SafeAccessor) -> Self {
        let mut engine = Self {
            list_key,
            fields,
            session,
            item,
            initial: ValueMap::new(),
            values: ValueMap::new(),
            loading: false,
            error: None,
            force_validation: false,
            notifier: Arc::new(TracingNotifier),
        };
        engine.initialize();
        engine
    }

    /// Replaces the default [`TracingNotifier`].
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Fetches an item and starts editing it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Backend`] on transport failure and
    /// [`FormError::Rejected`] when the backend reports request-level errors.
    pub async fn load(
        backend: &dyn ItemBackend,
        list_key: impl Into<String>,
        fields: Arc<FieldSet>,
        id: &str,
    ) -> Result<Self, FormError> {
        let list_key = list_key.into();
        let response = backend
            .fetch_item(&list_key, id, &fields.selections())
            .await
            .map_err(|err| FormError::backend(&err))?;
        let item = accept(response)?;
        Ok(Self::update(list_key, fields, item))
    }

    /// Refetches the current item and applies it through [`Self::item_changed`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`], plus [`FormError::MissingItemId`] for a
    /// session without a resolvable id.
    pub async fn refresh(&mut self, backend: &dyn ItemBackend) -> Result<(), FormError> {
        let id = self.item_id().ok_or(FormError::MissingItemId)?;
        self.loading = true;
        let response = backend
            .fetch_item(&self.list_key, &id, &self.fields.selections())
            .await;
        self.loading = false;
        let next = accept(response.map_err(|err| FormError::backend(&err))?)?;
        self.item_changed(next);
        Ok(())
    }

    fn initialize(&mut self) {
        let values: ValueMap = self
            .fields
            .iter()
            .map(|field| {
                let value = match self.session {
                    Session::Create => field.default_value(),
                    Session::Update => field.deserialize(&self.item),
                };
                (field.path().to_string(), value)
            })
            .collect();
        self.initial = values.clone();
        self.values = values;
    }

    /// Applies a new item snapshot.
    ///
    /// Values are re-deserialized unless the snapshot carries exactly one
    /// error and it targets a single field; in that case in-progress edits
    /// are kept and only the snapshot is replaced.
    pub fn item_changed(&mut self, next: SafeAccessor) {
        if next.ptr_eq(&self.item) {
            return;
        }
        let preserve_edits = matches!(next.errors(), [only] if only.is_field_level());
        self.item = next;
        if preserve_edits {
            tracing::debug!(list = %self.list_key, "keeping edits across a partially denied refetch");
        } else {
            self.initialize();
        }
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session
    }

    #[must_use]
    pub fn item(&self) -> &SafeAccessor {
        &self.item
    }

    #[must_use]
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    #[must_use]
    pub fn value(&self, path: &str) -> Option<&EditValue> {
        self.values.get(path)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Whether the UI should reveal every field's validation errors.
    #[must_use]
    pub fn force_validation(&self) -> bool {
        self.force_validation
    }

    /// The item id from the snapshot, as a string.
    #[must_use]
    pub fn item_id(&self) -> Option<String> {
        match self.item.get("id").data() {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Validation of one field's current value.
    #[must_use]
    pub fn validation(&self, path: &str) -> Option<ValidationResult> {
        let field = self.fields.get(path)?;
        self.values.get(path).map(|value| field.validate(value))
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    fn field(&self, path: &str) -> Result<&dyn FieldController, FormError> {
        self.fields.get(path).ok_or_else(|| FormError::UnknownField {
            path: path.to_string(),
        })
    }

    /// Replaces one field's edit value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for a path not in the field set.
    pub fn set(&mut self, path: &str, value: EditValue) -> Result<(), FormError> {
        self.field(path)?;
        self.values.insert(path.to_string(), value);
        Ok(())
    }

    /// Replaces one field's current value, keeping its session kind and
    /// initial value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for a path not in the field set.
    pub fn edit(&mut self, path: &str, value: FieldValue) -> Result<(), FormError> {
        let field = self.field(path)?;
        let next = match self.values.get(path) {
            Some(current) => current.with_value(value),
            None => field.default_value().with_value(value),
        };
        self.values.insert(path.to_string(), next);
        Ok(())
    }

    /// Applies free-text input to a field. Returns `false` when the field's
    /// kind is not edited as text.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for a path not in the field set.
    pub fn input(&mut self, path: &str, text: &str) -> Result<bool, FormError> {
        match self.field(path)?.parse_input(text) {
            Some(value) => self.edit(path, value).map(|()| true),
            None => Ok(false),
        }
    }

    /// Discards every edit and clears forced validation.
    pub fn reset(&mut self) {
        self.initialize();
        self.force_validation = false;
    }

    // -----------------------------------------------------------------------
    // Diffing and validation
    // -----------------------------------------------------------------------

    /// Paths whose serialized value differs from the starting point: the
    /// server value on update, the default value on create.
    #[must_use]
    pub fn changed_fields(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter(|field| {
                let Some(current) = self.values.get(field.path()) else {
                    return false;
                };
                let baseline = match self.session {
                    Session::Update => self.initial.get(field.path()).cloned(),
                    Session::Create => Some(field.default_value()),
                };
                baseline.map_or(true, |baseline| {
                    field.serialize(current) != field.serialize(&baseline)
                })
            })
            .map(|field| field.path().to_string())
            .collect()
    }

    /// The save payload: serialized values of changed fields only.
    #[must_use]
    pub fn payload(&self) -> Payload {
        let changed = self.changed_fields();
        let mut payload = Payload::new();
        for field in self.fields.iter().filter(|f| changed.contains(f.path())) {
            if let Some(value) = self.values.get(field.path()) {
                payload.extend(field.serialize(value));
            }
        }
        payload
    }

    /// Paths whose current value fails validation.
    #[must_use]
    pub fn invalid_fields(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter(|field| {
                self.values
                    .get(field.path())
                    .is_some_and(|value| !field.validate(value).is_valid())
            })
            .map(|field| field.path().to_string())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Validates and saves the changed fields.
    ///
    /// On failure the edit values are left untouched, the error is stored in
    /// [`Self::error`] and a negative notice is raised.
    ///
    /// # Errors
    ///
    /// [`FormError::MissingItemId`] when an update session has no id,
    /// [`FormError::Backend`] on transport failure and
    /// [`FormError::Rejected`] when the backend reports request-level errors.
    pub async fn save(&mut self, backend: &dyn ItemBackend) -> Result<SaveOutcome, FormError> {
        self.error = None;
        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            self.force_validation = true;
            return Ok(SaveOutcome::Invalid(invalid));
        }
        let changed = self.changed_fields();
        let id = match self.session {
            Session::Update if changed.is_empty() => return Ok(SaveOutcome::Unchanged),
            Session::Update => match self.item_id() {
                Some(id) => Some(id),
                None => return Err(self.fail(FormError::MissingItemId)),
            },
            Session::Create => None,
        };

        let payload = self.payload();
        let selections = self.fields.selections();
        let span = tracing::info_span!(
            "save",
            list = %self.list_key,
            item_id = id.as_deref().unwrap_or(""),
            changed = ?changed,
        );

        self.loading = true;
        let response = match &id {
            Some(id) => {
                backend
                    .update_item(&self.list_key, id, &payload, &selections)
                    .instrument(span)
                    .await
            }
            None => {
                backend
                    .create_item(&self.list_key, &payload, &selections)
                    .instrument(span)
                    .await
            }
        };
        self.loading = false;

        let item = match response.map_err(|err| FormError::backend(&err)).and_then(accept) {
            Ok(item) => item,
            Err(err) => return Err(self.fail(err)),
        };
        self.item = item;
        self.session = Session::Update;
        self.initialize();
        self.force_validation = false;
        self.notifier.notify(Notice {
            tone: Tone::Positive,
            title: "Saved successfully".to_string(),
            message: None,
        });
        Ok(SaveOutcome::Saved)
    }

    fn fail(&mut self, err: FormError) -> FormError {
        tracing::warn!(list = %self.list_key, error = %err, "save failed");
        self.notifier.notify(Notice {
            tone: Tone::Negative,
            title: "Unable to save".to_string(),
            message: Some(err.to_string()),
        });
        self.error = Some(err.clone());
        err
    }
}

/// Turns a response into an item snapshot, failing on request-level errors.
fn accept(response: ItemResponse) -> Result<SafeAccessor, FormError> {
    let messages: Vec<String> = response
        .top_level_errors()
        .map(|e| e.message.clone())
        .collect();
    if messages.is_empty() {
        Ok(response.into_accessor())
    } else {
        Err(FormError::Rejected { messages })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
