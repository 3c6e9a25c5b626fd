use form_spec::{
    BranchPolicy, ExportFormat, FormDefinition, FormDraft, PublicForm, ResponseData,
    ResponseRecord, ResponsesView, ValidationOptions, build_table, validate,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::{FormStore, StoreError};

/// Knobs applied by a [`FormDesk`] to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskSettings {
    /// Lifetime given to drafts without an explicit expiry; `None` keeps them open.
    pub default_expiry: Option<Duration>,
    pub branch_policy: BranchPolicy,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            default_expiry: Some(Duration::hours(24)),
            branch_policy: BranchPolicy::default(),
        }
    }
}

/// Front desk for a store: creates forms, takes submissions and serves
/// password-checked views and exports.
#[derive(Debug, Clone)]
pub struct FormDesk<S> {
    store: S,
    settings: DeskSettings,
}

impl<S: FormStore> FormDesk<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            settings: DeskSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DeskSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Normalizes `draft` the way [`FormDesk::create`] would, without storing it.
    pub fn check_draft(
        &self,
        draft: &FormDraft,
        now: OffsetDateTime,
    ) -> Result<FormDefinition, StoreError> {
        Ok(draft.build(now, self.settings.default_expiry)?)
    }

    pub fn create(
        &self,
        draft: &FormDraft,
        now: OffsetDateTime,
    ) -> Result<FormDefinition, StoreError> {
        let form = self.check_draft(draft, now)?;
        self.store.create_form(form.clone())?;
        info!(uuid = %form.uuid, title = %form.title, "created form");
        Ok(form)
    }

    /// The respondent's view of form `uuid`.
    pub fn public_form(&self, uuid: Uuid) -> Result<PublicForm, StoreError> {
        let form = self.store.get_form(uuid)?;
        Ok(PublicForm::from(&form))
    }

    /// Validates `data` against form `uuid` and appends it when it passes.
    pub fn submit(
        &self,
        uuid: Uuid,
        data: ResponseData,
        now: OffsetDateTime,
    ) -> Result<ResponseRecord, StoreError> {
        let form = self.store.get_form(uuid)?;
        let options = ValidationOptions::at(now).with_branch_policy(self.settings.branch_policy);
        if let Err(err) = validate(&form, &data, &options) {
            warn!(%uuid, error = %err, "rejected response");
            return Err(err.into());
        }

        let record = ResponseRecord::new(uuid, data, now);
        self.store.append_response(uuid, record.clone())?;
        info!(%uuid, response = %record.id, "stored response");
        Ok(record)
    }

    /// Every response to form `uuid`, once `password` checks out.
    pub fn responses(
        &self,
        uuid: Uuid,
        password: Option<&str>,
    ) -> Result<ResponsesView, StoreError> {
        let form = self.authorized_form(uuid, password)?;
        let responses = self.store.list_responses(uuid)?;
        Ok(ResponsesView::new(&form, responses))
    }

    /// Renders every response to form `uuid` in `format`.
    pub fn export(
        &self,
        uuid: Uuid,
        password: Option<&str>,
        format: ExportFormat,
    ) -> Result<String, StoreError> {
        let form = self.authorized_form(uuid, password)?;
        let responses = self.store.list_responses(uuid)?;
        let table = build_table(&form, &responses);
        debug!(%uuid, %format, rows = table.rows.len(), "rendering export");
        Ok(format.render(&table)?)
    }

    fn authorized_form(
        &self,
        uuid: Uuid,
        password: Option<&str>,
    ) -> Result<FormDefinition, StoreError> {
        let form = self.store.get_form(uuid)?;
        if let Err(err) = form.check_password(password) {
            warn!(%uuid, error = %err, "refused response view");
            return Err(err.into());
        }
        Ok(form)
    }
}
