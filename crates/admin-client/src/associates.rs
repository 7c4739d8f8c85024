//! Associates module controller
//!
//! Keeps an in-memory copy of the associate list in step with the backend.
//! Every successful create, update or delete is followed by a fresh fetch;
//! nothing is changed locally before the backend confirms a write.

use std::sync::Arc;
use tracing::{debug, info, warn};

use coop_core::associate::{filter_associates, Associate, AssociateForm, ListQuery};

use crate::api::AssociatesApi;
use crate::error::{ClientError, Result};

const SAVE_FAILED: &str = "Could not save the associate";
const DELETE_FAILED: &str = "Could not delete the associate";

/// Interactive confirmation before destructive actions
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Listing,
    /// Form open; `id` is `None` when creating a new record
    Editing { id: Option<i64> },
}

/// User-facing outcome of the last action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }
}

pub struct AssociatesController {
    api: Arc<dyn AssociatesApi>,
    query: ListQuery,
    items: Vec<Associate>,
    search: String,
    mode: Mode,
    form: AssociateForm,
    error: Option<String>,
    notice: Option<Notice>,
}

impl AssociatesController {
    pub fn new(api: Arc<dyn AssociatesApi>) -> Self {
        Self {
            api,
            query: ListQuery::default(),
            items: Vec::new(),
            search: String::new(),
            mode: Mode::Listing,
            form: AssociateForm::default(),
            error: None,
            notice: None,
        }
    }

    /// Server-side filters applied to every fetch
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    /// Load the list when the module is opened
    pub async fn mount(&mut self) -> Result<()> {
        self.fetch_all().await
    }

    /// Replace the local list with the backend's
    ///
    /// On failure the list is emptied and the error kept for display.
    pub async fn fetch_all(&mut self) -> Result<()> {
        match self.api.list(&self.query).await {
            Ok(items) => {
                debug!("Loaded {} associates", items.len());
                self.items = items;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load associates: {}", e);
                self.items.clear();
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn items(&self) -> &[Associate] {
        &self.items
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Records matching `term` in the current list
    pub fn filter(&self, term: &str) -> Vec<&Associate> {
        filter_associates(&self.items, term)
    }

    /// Records matching the current search term
    pub fn visible(&self) -> Vec<&Associate> {
        self.filter(&self.search)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing { .. })
    }

    pub fn form(&self) -> &AssociateForm {
        &self.form
    }

    /// Editable form, available only while editing
    pub fn form_mut(&mut self) -> Option<&mut AssociateForm> {
        if self.is_editing() {
            Some(&mut self.form)
        } else {
            None
        }
    }

    /// Error from the last failed fetch
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Open a blank form
    pub fn begin_create(&mut self) {
        self.form = AssociateForm::default();
        self.mode = Mode::Editing { id: None };
    }

    /// Open the form on a copy of an existing record
    ///
    /// Records outside the loaded list are fetched individually.
    pub async fn begin_edit(&mut self, id: i64) -> Result<()> {
        let associate = match self.items.iter().find(|a| a.id == id) {
            Some(associate) => associate.clone(),
            None => self.show(id).await?,
        };

        self.form = AssociateForm::from_associate(&associate);
        self.mode = Mode::Editing { id: Some(id) };
        Ok(())
    }

    /// Close the form without saving
    pub fn cancel(&mut self) {
        self.mode = Mode::Listing;
        self.form = AssociateForm::default();
    }

    /// Fetch a single record
    pub async fn show(&self, id: i64) -> Result<Associate> {
        self.api.get(id).await.map_err(|e| match e {
            ClientError::Status { status: 404, .. } => coop_core::Error::AssociateNotFound(id).into(),
            other => other,
        })
    }

    /// Send the form to the backend
    ///
    /// Creates when the form was opened blank, updates otherwise. On failure
    /// the form stays open with its contents untouched.
    pub async fn submit(&mut self) -> Result<()> {
        let editing_id = match self.mode {
            Mode::Editing { id } => id,
            Mode::Listing => {
                return Err(coop_core::Error::InvalidState(
                    "no associate form is open".to_string(),
                )
                .into());
            }
        };

        let payload = self.form.to_payload();
        let result = match editing_id {
            Some(id) => self.api.update(id, &payload).await,
            None => self.api.create(&payload).await,
        };

        if let Err(e) = result {
            warn!("Failed to save associate: {}", e);
            self.notice = Some(Notice::Error(save_failure_message(&e)));
            return Err(e);
        }

        if let Err(e) = self.fetch_all().await {
            debug!("Refetch after save failed: {}", e);
        }

        self.mode = Mode::Listing;
        self.form = AssociateForm::default();

        let message = if editing_id.is_some() {
            "Associate updated"
        } else {
            "Associate created"
        };
        info!("{}", message);
        self.notice = Some(Notice::Success(message.to_string()));
        Ok(())
    }

    /// Delete a record after confirmation
    ///
    /// Returns `false` when the user declined; nothing is sent in that case.
    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) -> Result<bool> {
        if !confirm.confirm(&format!("Delete associate {}?", id)) {
            debug!("Delete of associate {} cancelled", id);
            return Ok(false);
        }

        if let Err(e) = self.api.delete(id).await {
            warn!("Failed to delete associate {}: {}", id, e);
            let message = match e {
                ClientError::NotAuthenticated | ClientError::SessionExpired => e.user_message(),
                _ => DELETE_FAILED.to_string(),
            };
            self.notice = Some(Notice::Error(message));
            return Err(e);
        }

        if let Err(e) = self.fetch_all().await {
            debug!("Refetch after delete failed: {}", e);
        }

        self.notice = Some(Notice::Success("Associate deleted".to_string()));
        Ok(true)
    }
}

fn save_failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ClientError::NotAuthenticated | ClientError::SessionExpired => err.user_message(),
        _ => SAVE_FAILED.to_string(),
    }
}
