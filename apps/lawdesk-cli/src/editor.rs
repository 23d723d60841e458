//! The client form, shared by create and edit.

use uuid::Uuid;

use crate::api::{ApiClient, ApiError};
use crate::model::{Client, ClientForm};
use crate::page::ClientsPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("closed editor cannot submit")]
    Closed,
    #[error(transparent)]
    Rejected(#[from] ApiError),
}

#[derive(Debug)]
pub struct ClientEditor {
    mode: EditorMode,
    pub form: ClientForm,
    open: bool,
}

impl ClientEditor {
    /// Edit mode when `existing` is given, create mode otherwise.
    pub fn open(existing: Option<&Client>) -> Self {
        match existing {
            Some(c) => Self {
                mode: EditorMode::Edit(c.id),
                form: ClientForm::from(c),
                open: true,
            },
            None => Self {
                mode: EditorMode::Create,
                form: ClientForm::default(),
                open: true,
            },
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Add New Client",
            EditorMode::Edit(_) => "Edit Client",
        }
    }

    /// Only the required-field checks; everything else is left to the server.
    pub fn validate(&self) -> Result<(), EditorError> {
        let missing: Vec<&'static str> = [
            ("firstName", &self.form.first_name),
            ("lastName", &self.form.last_name),
            ("email", &self.form.email),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EditorError::MissingFields(missing))
        }
    }

    /// Send the form and refresh `page`. The editor closes on success and stays
    /// open with the error on failure.
    ///
    /// Returns `Ok(None)` when an edited record no longer exists on the server.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        page: &mut ClientsPage,
    ) -> Result<Option<Client>, EditorError> {
        if !self.open {
            return Err(EditorError::Closed);
        }
        self.validate()?;

        let saved = match self.mode {
            EditorMode::Create => page.add(api, &self.form).await.map(Some),
            EditorMode::Edit(id) => page.edit(api, id, &self.form).await,
        };
        match saved {
            Ok(client) => {
                self.open = false;
                Ok(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, mode = ?self.mode, "client write rejected");
                Err(e.into())
            }
        }
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }
}
