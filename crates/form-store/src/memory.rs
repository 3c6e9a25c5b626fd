use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use form_spec::{FormDefinition, ResponseRecord};
use tracing::debug;
use uuid::Uuid;

use crate::store::{FormStore, StoreError};

#[derive(Debug)]
struct Slot {
    form: FormDefinition,
    responses: Vec<ResponseRecord>,
}

/// Process-local store; everything is lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: DashMap<Uuid, Slot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl FormStore for MemoryStore {
    fn create_form(&self, form: FormDefinition) -> Result<Uuid, StoreError> {
        let uuid = form.uuid;
        match self.forms.entry(uuid) {
            Entry::Occupied(_) => Err(StoreError::FormExists(uuid)),
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    form,
                    responses: Vec::new(),
                });
                Ok(uuid)
            }
        }
    }

    fn get_form(&self, uuid: Uuid) -> Result<FormDefinition, StoreError> {
        debug!(%uuid, "loading form from memory");
        self.forms
            .get(&uuid)
            .map(|slot| slot.form.clone())
            .ok_or(StoreError::FormNotFound(uuid))
    }

    fn append_response(&self, uuid: Uuid, record: ResponseRecord) -> Result<Uuid, StoreError> {
        let mut slot = self
            .forms
            .get_mut(&uuid)
            .ok_or(StoreError::FormNotFound(uuid))?;
        let id = record.id;
        slot.responses.push(record);
        Ok(id)
    }

    fn list_responses(&self, uuid: Uuid) -> Result<Vec<ResponseRecord>, StoreError> {
        self.forms
            .get(&uuid)
            .map(|slot| slot.responses.clone())
            .ok_or(StoreError::FormNotFound(uuid))
    }
}

#[cfg(test)]
mod tests {
    use form_spec::{FieldDraft, FieldKind, FormDraft, ResponseData};
    use time::OffsetDateTime;

    use super::*;

    fn form() -> FormDefinition {
        FormDraft::new("Poll", vec![FieldDraft::new("q", FieldKind::Text)])
            .build(OffsetDateTime::UNIX_EPOCH, None)
            .unwrap()
    }

    #[test]
    fn refuses_duplicate_uuids() {
        let store = MemoryStore::new();
        let form = form();
        store.create_form(form.clone()).unwrap();
        assert!(matches!(
            store.create_form(form),
            Err(StoreError::FormExists(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn responses_keep_submission_order() {
        let store = MemoryStore::new();
        let uuid = store.create_form(form()).unwrap();
        let first = ResponseRecord::new(uuid, ResponseData::new(), OffsetDateTime::UNIX_EPOCH);
        let second = ResponseRecord::new(uuid, ResponseData::new(), OffsetDateTime::UNIX_EPOCH);
        let ids = [first.id, second.id];
        store.append_response(uuid, first).unwrap();
        store.append_response(uuid, second).unwrap();
        let listed: Vec<_> = store
            .list_responses(uuid)
            .unwrap()
            .iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn unknown_form_is_not_found() {
        let store = MemoryStore::new();
        let uuid = Uuid::new_v4();
        assert!(matches!(
            store.list_responses(uuid),
            Err(StoreError::FormNotFound(missing)) if missing == uuid
        ));
    }
}
