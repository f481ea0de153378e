//! Shared stage-controller contract and the editing machinery stages reuse.
//!
//! Every stage 1-5 controller follows the same shape: fetch-or-reuse a
//! suggestion built from upstream slots, let the user edit the draft, then
//! validate and commit the assembled payload to its slot. Validation blocks
//! the advance action with a message; it never throws and never does I/O.

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::failure::FailureKind;
use crate::model::ListItem;
use crate::services::SuggestionService;
use crate::step::StepIndex;
use crate::store::WorkflowState;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

/// The generic stage contract, instantiated once per stage 1-5.
#[async_trait]
pub trait StepController {
    /// The stage this controller drives.
    fn step(&self) -> StepIndex;

    /// Fetches a suggestion from the upstream committed context, or reuses
    /// the existing draft when that context has not changed. A failed fetch
    /// leaves the controller in its pre-fetch state; retrying is calling
    /// this again.
    async fn suggest(
        &mut self,
        state: &WorkflowState,
        service: &dyn SuggestionService,
        config: &WorkflowConfig,
    ) -> Result<(), WorkflowError>;

    /// Checks the stage-specific completeness rule. The error message is
    /// user-facing and names the blocking rule.
    fn validate(&self) -> Result<(), WorkflowError>;

    /// Validates, then writes the fully assembled payload to this stage's
    /// slot. Control passes to the next stage afterwards.
    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError>;
}

/// An id-addressed list that keeps suggestion-provided and user-added items
/// apart so a re-fetch can replace the former without discarding the latter.
///
/// Ids are unique within the list after any operation. Editing a suggested
/// item transfers it to user ownership, so the edit also survives re-fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableList {
    items: Vec<ListItem>,
    suggested: BTreeSet<String>,
}

impl EditableList {
    pub fn from_suggestions(texts: &[String]) -> Self {
        let mut list = Self::default();
        list.replace_suggestions(texts);
        list
    }

    /// Swaps out the suggestion-owned items for a fresh set, retaining every
    /// user-owned item.
    pub fn replace_suggestions(&mut self, texts: &[String]) {
        self.items.retain(|item| !self.suggested.contains(&item.id));
        self.suggested.clear();
        let mut fresh: Vec<ListItem> = texts.iter().map(ListItem::new).collect();
        for item in &fresh {
            self.suggested.insert(item.id.clone());
        }
        fresh.append(&mut self.items);
        self.items = fresh;
    }

    /// Appends a user-owned item and returns its fresh id.
    pub fn add(&mut self, text: impl Into<String>) -> String {
        let item = ListItem::new(text);
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Replaces the text of the item with the given id. The item becomes
    /// user-owned.
    pub fn edit(&mut self, id: &str, text: impl Into<String>) -> Result<(), WorkflowError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| unknown_item(id))?;
        item.text = text.into();
        self.suggested.remove(id);
        Ok(())
    }

    /// Removes the item with the given id.
    pub fn delete(&mut self, id: &str) -> Result<(), WorkflowError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(unknown_item(id));
        }
        self.suggested.remove(id);
        Ok(())
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ListItem> {
        self.items
    }
}

fn unknown_item(id: &str) -> WorkflowError {
    WorkflowError::validation(format!("no list item with id {}", id))
}

/// Awaits a service call under the configured upper bound, classifying the
/// failure. Expiry of the bound is a failure like any other.
pub(crate) async fn call_bounded<T, F>(limit: Duration, call: F) -> Result<T, (FailureKind, String)>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            let message = format!("{:#}", err);
            Err((FailureKind::classify(&message), message))
        }
        Err(_) => Err((
            FailureKind::Timeout,
            format!("no response after {}s", limit.as_secs()),
        )),
    }
}

/// Maps a classified call failure to a stage suggestion error.
pub(crate) fn suggestion_error(step: StepIndex, failure: (FailureKind, String)) -> WorkflowError {
    let (kind, message) = failure;
    WorkflowError::Suggestion {
        step,
        kind,
        message,
    }
}

/// The "stage n reads slots 1..n-1" precondition: upstream slots must be
/// committed before a downstream suggestion can be requested.
pub(crate) fn missing_upstream(step: StepIndex, upstream: StepIndex) -> WorkflowError {
    WorkflowError::validation(format!(
        "{} must be committed before {} can request a suggestion",
        upstream, step
    ))
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
