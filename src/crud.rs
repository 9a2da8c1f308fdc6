//! The lifecycle every record screen shares: load on open, search in
//! memory, submit a create or edit form, confirm then delete.

use chrono::FixedOffset;
use tracing::{error, info, warn};

use crate::api::Backend;
use crate::catalog::{record_id, Record, Resource};
use crate::draft::Draft;
use crate::error::AdminError;
use crate::search;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

/// Yes/no question asked before a destructive action
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleState {
    Idle,
    Loading,
    FormOpen { mode: FormMode, draft: Draft },
    Submitting { mode: FormMode },
    Confirming { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// One CRUD screen bound to a resource and a backend
pub struct CrudModule<B: Backend> {
    resource: &'static Resource,
    backend: B,
    offset: FixedOffset,
    records: Vec<Record>,
    state: ModuleState,
    last_error: Option<String>,
}

impl<B: Backend> CrudModule<B> {
    pub fn new(resource: &'static Resource, backend: B, offset: FixedOffset) -> Self {
        Self {
            resource,
            backend,
            offset,
            records: Vec::new(),
            state: ModuleState::Idle,
            last_error: None,
        }
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| record_id(r).as_deref() == Some(id))
    }

    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// Message of the most recent failed request, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the whole collection. On failure the previous list stays.
    pub async fn load(&mut self) -> Result<(), AdminError> {
        self.state = ModuleState::Loading;
        let result = self.backend.list(self.resource).await;
        self.state = ModuleState::Idle;

        match result {
            Ok(records) => {
                info!("Loaded {} {} records", records.len(), self.resource.slug);
                self.records = records;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching {}: {}", self.resource.slug, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn open_create(&mut self) -> Result<&mut Draft, AdminError> {
        let draft = Draft::empty(self.resource);
        self.state = ModuleState::FormOpen {
            mode: FormMode::Create,
            draft,
        };
        self.draft_mut()
            .ok_or_else(|| AdminError::invalid_state("create form did not open"))
    }

    /// Open the edit form pre-populated with the record's current values
    pub fn open_edit(&mut self, id: &str) -> Result<&mut Draft, AdminError> {
        let record = self.record(id).ok_or_else(|| AdminError::unknown_record(id))?;
        let draft = Draft::from_record(self.resource, record, self.offset);
        self.state = ModuleState::FormOpen {
            mode: FormMode::Edit { id: id.to_string() },
            draft,
        };
        self.draft_mut()
            .ok_or_else(|| AdminError::invalid_state("edit form did not open"))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            ModuleState::FormOpen { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            ModuleState::FormOpen { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Close the form without sending anything
    pub fn cancel(&mut self) {
        if matches!(self.state, ModuleState::FormOpen { .. }) {
            self.state = ModuleState::Idle;
        }
    }

    /// POST or PUT the open form, then re-fetch the whole collection.
    ///
    /// A rejected draft or failed request keeps the form open with the
    /// draft intact. Once the write is accepted the call succeeds even if
    /// the re-fetch does not.
    pub async fn submit(&mut self) -> Result<(), AdminError> {
        let (mode, draft) = match std::mem::replace(&mut self.state, ModuleState::Idle) {
            ModuleState::FormOpen { mode, draft } => (mode, draft),
            other => {
                self.state = other;
                return Err(AdminError::invalid_state("no form is open"));
            }
        };

        let payload = match draft.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                let err = AdminError::from(e);
                self.last_error = Some(err.to_string());
                self.state = ModuleState::FormOpen { mode, draft };
                return Err(err);
            }
        };

        self.state = ModuleState::Submitting { mode: mode.clone() };
        let result = match &mode {
            FormMode::Create => self.backend.create(self.resource, &payload).await,
            FormMode::Edit { id } => self.backend.update(self.resource, id, &payload).await,
        };

        match result {
            Ok(_) => {
                self.state = ModuleState::Idle;
                self.last_error = None;
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!("Error saving {} record: {}", self.resource.slug, e);
                self.last_error = Some(e.to_string());
                self.state = ModuleState::FormOpen { mode, draft };
                Err(e)
            }
        }
    }

    /// Ask for confirmation, then DELETE and re-fetch. Declining sends nothing.
    pub async fn request_delete(
        &mut self,
        id: &str,
        confirmer: &mut impl Confirm,
    ) -> Result<DeleteOutcome, AdminError> {
        if self.record(id).is_none() {
            return Err(AdminError::unknown_record(id));
        }

        self.state = ModuleState::Confirming { id: id.to_string() };
        if !confirmer.confirm(DELETE_PROMPT) {
            self.state = ModuleState::Idle;
            return Ok(DeleteOutcome::Declined);
        }

        let result = self.backend.delete(self.resource, id).await;
        self.state = ModuleState::Idle;
        match result {
            Ok(()) => {
                self.last_error = None;
                self.refresh().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!("Error deleting {} {}: {}", self.resource.slug, id, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-fetch after a write that already succeeded. A failed fetch is
    /// logged and kept in `last_error`; the write still stands.
    async fn refresh(&mut self) {
        if self.load().await.is_err() {
            warn!("{} list is stale until the next load", self.resource.slug);
        }
    }

    /// Records matching the search term, recomputed over the full list
    pub fn filtered(&self, term: &str) -> Vec<&Record> {
        search::filter(&self.records, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::dates::local_offset;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(Value),
        Update(String, Value),
        Delete(String),
    }

    #[derive(Default)]
    struct FakeBackend {
        store: Mutex<Vec<Record>>,
        calls: Mutex<Vec<Call>>,
        fail_writes: bool,
        fail_lists: Mutex<bool>,
    }

    impl FakeBackend {
        fn with(records: Vec<Value>) -> Self {
            let backend = Self::default();
            *backend.store.lock().unwrap() = records
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect();
            backend
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn list(&self, _resource: &Resource) -> Result<Vec<Record>, AdminError> {
            self.calls.lock().unwrap().push(Call::List);
            if *self.fail_lists.lock().unwrap() {
                return Err(AdminError::Transport("connection refused".into()));
            }
            Ok(self.store.lock().unwrap().clone())
        }

        async fn create(&self, _resource: &Resource, body: &Value) -> Result<Value, AdminError> {
            self.calls.lock().unwrap().push(Call::Create(body.clone()));
            if self.fail_writes {
                return Err(AdminError::from_status(500, "write failed"));
            }
            let mut record = body.as_object().cloned().unwrap();
            let id = format!("id{}", self.store.lock().unwrap().len() + 1);
            record.insert("_id".into(), json!(id));
            self.store.lock().unwrap().push(record.clone());
            Ok(Value::Object(record))
        }

        async fn update(&self, _resource: &Resource, id: &str, body: &Value) -> Result<Value, AdminError> {
            self.calls.lock().unwrap().push(Call::Update(id.to_string(), body.clone()));
            if self.fail_writes {
                return Err(AdminError::from_status(500, "write failed"));
            }
            let mut store = self.store.lock().unwrap();
            let record = store
                .iter_mut()
                .find(|r| record_id(r).as_deref() == Some(id))
                .ok_or_else(|| AdminError::from_status(404, "not found"))?;
            for (k, v) in body.as_object().unwrap() {
                record.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(record.clone()))
        }

        async fn delete(&self, _resource: &Resource, id: &str) -> Result<(), AdminError> {
            self.calls.lock().unwrap().push(Call::Delete(id.to_string()));
            self.store.lock().unwrap().retain(|r| record_id(r).as_deref() != Some(id));
            Ok(())
        }
    }

    fn attendance() -> &'static Resource {
        catalog::find("attendance").unwrap()
    }

    fn seeded() -> FakeBackend {
        FakeBackend::with(vec![
            json!({"_id": "a1", "employeeName": "Ramesh", "date": "2024-05-01T00:00:00.000Z", "status": "Present"}),
            json!({"_id": "a2", "employeeName": "Pooja", "date": "2024-05-01T19:30:00.000Z", "status": "Leave"}),
        ])
    }

    fn module(backend: FakeBackend) -> CrudModule<FakeBackend> {
        CrudModule::new(attendance(), backend, local_offset(330))
    }

    #[tokio::test]
    async fn test_create_posts_once_then_refetches() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();

        let draft = screen.open_create().unwrap();
        draft.set("employeeName", "Imran").unwrap();
        draft.set("date", "2024-05-02").unwrap();
        draft.set("status", "Present").unwrap();
        screen.submit().await.unwrap();

        let calls = screen.backend().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::List);
        assert!(matches!(&calls[1], Call::Create(body) if body["employeeName"] == "Imran"));
        assert_eq!(calls[2], Call::List);
        assert_eq!(screen.records().len(), 3);
        assert_eq!(screen.state(), &ModuleState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing_and_stays_open() {
        let mut screen = module(seeded());
        screen.open_create().unwrap().set("employeeName", "Imran").unwrap();

        let err = screen.submit().await.unwrap_err();
        assert!(matches!(err, AdminError::Validation { .. }));
        assert!(screen.backend().calls().is_empty());
        assert_eq!(screen.draft().and_then(|d| d.get("employeeName")), Some("Imran"));
        assert!(screen.last_error().is_some());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_form_open() {
        let mut backend = seeded();
        backend.fail_writes = true;
        let mut screen = module(backend);
        screen.load().await.unwrap();

        screen.open_edit("a1").unwrap().set("status", "Absent").unwrap();
        assert!(screen.submit().await.is_err());

        assert!(matches!(
            screen.state(),
            ModuleState::FormOpen { mode: FormMode::Edit { id }, .. } if id == "a1"
        ));
        assert_eq!(screen.draft().and_then(|d| d.get("status")), Some("Absent"));
        // no re-fetch after the failed PUT
        assert_eq!(screen.backend().calls().last().map(|c| matches!(c, Call::Update(..))), Some(true));
    }

    #[tokio::test]
    async fn test_edit_prepopulates_and_puts_by_id() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();

        let draft = screen.open_edit("a2").unwrap();
        assert_eq!(draft.get("employeeName"), Some("Pooja"));
        assert_eq!(draft.get("date"), Some("2024-05-02"));
        draft.set("status", "Half Day").unwrap();
        screen.submit().await.unwrap();

        let calls = screen.backend().calls();
        assert!(matches!(&calls[1], Call::Update(id, body) if id == "a2" && body["status"] == "Half Day"));
        assert_eq!(calls[2], Call::List);
        assert_eq!(screen.record("a2").unwrap()["status"], "Half Day");
    }

    #[tokio::test]
    async fn test_declined_delete_sends_no_request() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();

        let mut asked = Vec::new();
        let outcome = screen
            .request_delete("a1", &mut |msg: &str| {
                asked.push(msg.to_string());
                false
            })
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(asked, vec![DELETE_PROMPT.to_string()]);
        assert_eq!(screen.backend().calls(), vec![Call::List]);
        assert_eq!(screen.records().len(), 2);
    }

    #[tokio::test]
    async fn test_confirmed_delete_then_refetch() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();

        let outcome = screen.request_delete("a1", &mut |_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(
            screen.backend().calls(),
            vec![Call::List, Call::Delete("a1".into()), Call::List]
        );
        assert!(screen.record("a1").is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_stale_list() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();
        *screen.backend().fail_lists.lock().unwrap() = true;

        assert!(screen.load().await.is_err());
        assert_eq!(screen.records().len(), 2);
        assert_eq!(screen.state(), &ModuleState::Idle);
        assert!(screen.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_accepted_create_succeeds_when_refetch_fails() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();
        *screen.backend().fail_lists.lock().unwrap() = true;

        let draft = screen.open_create().unwrap();
        draft.set("employeeName", "Imran").unwrap();
        draft.set("date", "2024-05-02").unwrap();
        draft.set("status", "Present").unwrap();
        screen.submit().await.unwrap();

        let calls = screen.backend().calls();
        assert!(matches!(&calls[1], Call::Create(_)));
        assert_eq!(calls[2], Call::List);
        assert_eq!(screen.backend().store.lock().unwrap().len(), 3);
        assert_eq!(screen.state(), &ModuleState::Idle);
        assert_eq!(screen.records().len(), 2);
        assert!(screen.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_accepted_delete_succeeds_when_refetch_fails() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();
        *screen.backend().fail_lists.lock().unwrap() = true;

        let outcome = screen.request_delete("a2", &mut |_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(screen.backend().store.lock().unwrap().len(), 1);
        assert!(screen.last_error().is_some());
    }

    #[tokio::test]
    async fn test_edit_keeps_unlisted_select_value() {
        let backend = FakeBackend::with(vec![json!({
            "_id": "a9",
            "employeeName": "Farhan",
            "date": "2024-05-01T00:00:00.000Z",
            "status": "Work From Home"
        })]);
        let mut screen = module(backend);
        screen.load().await.unwrap();

        screen.open_edit("a9").unwrap().set("remarks", "client visit").unwrap();
        screen.submit().await.unwrap();

        let calls = screen.backend().calls();
        assert!(matches!(
            &calls[1],
            Call::Update(id, body) if id == "a9"
                && body["status"] == "Work From Home"
                && body["remarks"] == "client visit"
        ));
    }

    #[tokio::test]
    async fn test_unknown_ids_and_filter() {
        let mut screen = module(seeded());
        screen.load().await.unwrap();

        assert!(matches!(screen.open_edit("zz"), Err(AdminError::UnknownRecord(_))));
        assert!(screen.request_delete("zz", &mut |_: &str| true).await.is_err());
        assert_eq!(screen.filtered("POOJA").len(), 1);
        assert_eq!(screen.filtered("").len(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let mut screen = module(seeded());
        assert!(matches!(screen.submit().await, Err(AdminError::InvalidState(_))));
        screen.open_create().unwrap();
        screen.cancel();
        assert_eq!(screen.state(), &ModuleState::Idle);
    }
}
