//! Load lifecycle for the contact collection.
//!
//! The store owns the current collection and replaces it wholesale when a
//! load settles successfully. Every load gets a [`LoadTicket`]; a result is
//! applied only if no newer load has already settled, so overlapping
//! refreshes resolve to the most recent settled fetch.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::contact::Contact;
use crate::remote::{FetchError, SheetSource};
use crate::sheet::{self, MapOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct ContactStore {
    state: LoadState,
    contacts: Arc<[Contact]>,
    issued: u64,
    settled: u64,
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            contacts: Arc::from(Vec::new()),
            issued: 0,
            settled: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Current collection. The previous collection survives a failed load.
    pub fn contacts(&self) -> Arc<[Contact]> {
        Arc::clone(&self.contacts)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Enter `Loading` and hand out a ticket for the result.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.issued)
    }

    /// Apply a finished load. Returns false when the result was superseded.
    pub fn settle(&mut self, ticket: LoadTicket, result: Result<Vec<Contact>, LoadError>) -> bool {
        if ticket.0 <= self.settled {
            warn!(ticket = ticket.0, settled = self.settled, "ignoring superseded load result");
            return false;
        }
        self.settled = ticket.0;

        match result {
            Ok(contacts) => {
                info!(contacts = contacts.len(), "contacts loaded");
                self.contacts = Arc::from(contacts);
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err, "load failed");
                self.state = LoadState::Error(err.to_string());
            }
        }

        // An older load can settle while a newer one is still in flight.
        if self.issued > self.settled {
            self.state = LoadState::Loading;
        }
        true
    }

    /// Fetch, parse and settle in one go.
    pub fn load(&mut self, source: &dyn SheetSource, options: &MapOptions) -> &LoadState {
        let ticket = self.begin_load();
        let result = fetch_contacts(source, options);
        self.settle(ticket, result);
        &self.state
    }
}

/// Fetch the sheet and map it into contacts.
pub fn fetch_contacts(
    source: &dyn SheetSource,
    options: &MapOptions,
) -> Result<Vec<Contact>, LoadError> {
    info!(source = %source.describe(), "fetching sheet");
    let text = source.fetch()?;
    Ok(sheet::parse_contacts(&text, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves queued responses in order.
    struct StubSource {
        responses: Mutex<Vec<Result<String, FetchError>>>,
    }

    impl StubSource {
        fn new(mut responses: Vec<Result<String, FetchError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl SheetSource for StubSource {
        fn fetch(&self) -> Result<String, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(FetchError::Transport("no more responses".into())))
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn server_error() -> FetchError {
        FetchError::Status {
            code: 500,
            reason: "Internal Server Error".to_string(),
        }
    }

    fn named(name: &str) -> Contact {
        Contact {
            company_name: name.to_string(),
            ..Contact::default()
        }
    }

    const SHEET: &str = "Card Name,City\nAcme,Austin\nGlobex,Dallas\n";

    #[test]
    fn starts_idle_and_empty() {
        let store = ContactStore::new();
        assert_eq!(store.state(), &LoadState::Idle);
        assert!(store.contacts().is_empty());
    }

    #[test]
    fn successful_load_becomes_ready() {
        let source = StubSource::new(vec![Ok(SHEET.to_string())]);
        let mut store = ContactStore::new();
        assert_eq!(store.load(&source, &MapOptions::default()), &LoadState::Ready);
        assert_eq!(store.contacts().len(), 2);
        assert_eq!(store.contacts()[0].company_name, "Acme");
    }

    #[test]
    fn server_error_keeps_previous_collection() {
        let source = StubSource::new(vec![Ok(SHEET.to_string()), Err(server_error())]);
        let mut store = ContactStore::new();
        store.load(&source, &MapOptions::default());
        let before = store.contacts();

        let state = store.load(&source, &MapOptions::default()).clone();
        match state {
            LoadState::Error(message) => assert!(message.contains("Internal Server Error")),
            other => panic!("expected error state, got {other:?}"),
        }
        assert_eq!(store.contacts(), before);
        assert_eq!(store.error().map(|m| m.contains("500")), Some(true));
    }

    #[test]
    fn refresh_after_error_recovers() {
        let source = StubSource::new(vec![Err(server_error()), Ok(SHEET.to_string())]);
        let mut store = ContactStore::new();
        assert!(matches!(store.load(&source, &MapOptions::default()), LoadState::Error(_)));
        assert_eq!(store.load(&source, &MapOptions::default()), &LoadState::Ready);
        assert_eq!(store.contacts().len(), 2);
    }

    #[test]
    fn begin_load_enters_loading() {
        let mut store = ContactStore::new();
        store.begin_load();
        assert!(store.is_loading());
    }

    #[test]
    fn superseded_result_is_ignored() {
        let mut store = ContactStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(store.settle(second, Ok(vec![named("Newer")])));
        assert!(!store.settle(first, Ok(vec![named("Older")])));

        assert_eq!(store.state(), &LoadState::Ready);
        assert_eq!(store.contacts()[0].company_name, "Newer");
    }

    #[test]
    fn older_result_settling_first_keeps_loading() {
        let mut store = ContactStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        assert!(store.settle(first, Ok(vec![named("Older")])));
        assert!(store.is_loading());
        assert_eq!(store.contacts()[0].company_name, "Older");

        assert!(store.settle(second, Ok(vec![named("Newer")])));
        assert_eq!(store.state(), &LoadState::Ready);
        assert_eq!(store.contacts()[0].company_name, "Newer");
    }

    #[test]
    fn readers_keep_their_snapshot_across_reloads() {
        let source = StubSource::new(vec![Ok(SHEET.to_string()), Ok("Card Name\nSolo\n".into())]);
        let mut store = ContactStore::new();
        store.load(&source, &MapOptions::default());
        let snapshot = store.contacts();

        store.load(&source, &MapOptions::default());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(store.contacts().len(), 1);
    }
}
