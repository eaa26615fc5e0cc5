//! Operational journal
//!
//! Every entry point opens a [`JournalCollection`] and appends notes while it runs.
//! The collection is committed to the bounded in-memory journal when it goes out of
//! scope, so failed operations are recorded as well. The journal is independent of
//! the allocation event log.

use candid::CandidType;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::{state::insert_journal_collection, utils::error::VaultResult};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(CandidType, Clone, Copy, Debug, Deserialize, PartialEq)]
pub enum LogType {
    Info,
    /// Final result of an entry point
    ExecutionResult,
    /// A committed change of the vault's allocation
    Allocation,
}

#[derive(CandidType, Clone, Copy, Debug, Deserialize, PartialEq)]
pub enum Operation {
    Init,
    Deposit,
    Withdraw,
    Rebalance,
    Receive,
}

/// Journal entry
#[derive(CandidType, Clone, Debug, Deserialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub entry: VaultResult<()>,
    pub log_type: LogType,
    pub operation: Option<Operation>,
    pub note: Option<String>,
}

/// Builder for journal entries
impl JournalEntry {
    /// Create a new instance of a journal entry
    /// Fills the `timestamp`, `entry` and `log_type` fields
    pub fn new(entry: VaultResult<()>, log_type: LogType) -> Self {
        Self {
            timestamp: now(),
            entry,
            log_type,
            operation: None,
            note: None,
        }
    }

    /// Fills the `operation` field of the entry
    pub fn operation(&mut self, operation: Operation) -> &mut Self {
        self.operation = Some(operation);
        self
    }

    /// Fills the `note` field of the entry
    pub fn note<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        self.note = Some(text.as_ref().to_string());
        self
    }

    /// Commits the entry to the journal on its own
    pub fn commit(&mut self) {
        insert_journal_collection(StableJournalCollection {
            start_date_and_time: self.timestamp.clone(),
            end_date_and_time: self.timestamp.clone(),
            operation: self.operation,
            entries: vec![self.clone()],
        });
    }
}

/// The entries of one operation, as stored in the journal
#[derive(CandidType, Clone, Debug, Deserialize)]
pub struct StableJournalCollection {
    pub start_date_and_time: String,
    pub end_date_and_time: String,
    pub operation: Option<Operation>,
    pub entries: Vec<JournalEntry>,
}

impl StableJournalCollection {
    /// Whether any entry of the collection recorded an error
    pub fn has_failure(&self) -> bool {
        self.entries.iter().any(|entry| entry.entry.is_err())
    }
}

/// Collects the entries of a running operation
pub struct JournalCollection {
    start_date_and_time: String,
    operation: Option<Operation>,
    entries: Vec<JournalEntry>,
}

impl JournalCollection {
    pub fn open(operation: Option<Operation>) -> Self {
        Self {
            start_date_and_time: now(),
            operation,
            entries: vec![],
        }
    }

    pub fn append_note<S: AsRef<str>>(
        &mut self,
        entry: VaultResult<()>,
        log_type: LogType,
        note: S,
    ) -> &mut Self {
        let mut journal_entry = JournalEntry::new(entry, log_type);
        journal_entry.note(note);
        if let Some(operation) = self.operation {
            journal_entry.operation(operation);
        }
        self.entries.push(journal_entry);
        self
    }
}

impl Drop for JournalCollection {
    /// Commits the collected entries
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        insert_journal_collection(StableJournalCollection {
            start_date_and_time: self.start_date_and_time.clone(),
            end_date_and_time: now(),
            operation: self.operation,
            entries: std::mem::take(&mut self.entries),
        });
    }
}
