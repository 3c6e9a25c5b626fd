use std::io;
use std::path::PathBuf;

use form_spec::{
    AccessError, DraftError, ExportError, FormDefinition, ResponseRecord, SubmissionError,
};
use thiserror::Error;
use uuid::Uuid;

/// Keyed storage for form definitions and their append-only response logs.
pub trait FormStore {
    /// Stores `form` under its uuid; refuses to overwrite an existing form.
    fn create_form(&self, form: FormDefinition) -> Result<Uuid, StoreError>;

    fn get_form(&self, uuid: Uuid) -> Result<FormDefinition, StoreError>;

    /// Appends `record` to the responses of form `uuid` and returns the record id.
    fn append_response(&self, uuid: Uuid, record: ResponseRecord) -> Result<Uuid, StoreError>;

    /// Responses of form `uuid` in submission order.
    fn list_responses(&self, uuid: Uuid) -> Result<Vec<ResponseRecord>, StoreError>;
}

impl<S: FormStore + ?Sized> FormStore for &S {
    fn create_form(&self, form: FormDefinition) -> Result<Uuid, StoreError> {
        (**self).create_form(form)
    }

    fn get_form(&self, uuid: Uuid) -> Result<FormDefinition, StoreError> {
        (**self).get_form(uuid)
    }

    fn append_response(&self, uuid: Uuid, record: ResponseRecord) -> Result<Uuid, StoreError> {
        (**self).append_response(uuid, record)
    }

    fn list_responses(&self, uuid: Uuid) -> Result<Vec<ResponseRecord>, StoreError> {
        (**self).list_responses(uuid)
    }
}

/// Errors raised by stores and the desk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("form {0} not found")]
    FormNotFound(Uuid),
    #[error("form {0} already exists")]
    FormExists(Uuid),
    #[error("access denied: {0}")]
    Unauthorized(#[from] AccessError),
    #[error("response rejected: {0}")]
    Rejected(#[from] SubmissionError),
    #[error("invalid form draft: {0}")]
    Draft(#[from] DraftError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }
}
