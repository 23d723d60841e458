//! Page models: one fetch on mount, an explicit state, and a client-side
//! filtered view for lists.

use std::future::Future;

use crate::api::{ApiClient, ApiError};
use crate::model::{Appointment, Case, Client, ClientForm};
use uuid::Uuid;

/// `Loading` settles exactly once into one of the other states. Later
/// settles are ignored; only a new mount starts over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState<T> {
    Loading,
    Loaded(T),
    NotFound,
    Error(String),
}

impl<T> PageState<T> {
    pub fn settle(self, outcome: Result<Option<T>, ApiError>) -> Self {
        match self {
            Self::Loading => match outcome {
                Ok(Some(v)) => Self::Loaded(v),
                Ok(None) => Self::NotFound,
                Err(e) => {
                    tracing::error!(error = %e, "page fetch failed");
                    Self::Error(e.to_string())
                }
            },
            settled => settled,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// A collection page. Lists never settle into `NotFound`.
pub struct ListPage<T> {
    pub state: PageState<Vec<T>>,
    pub search: String,
    filter: fn(&T, &str) -> bool,
}

impl<T> ListPage<T> {
    pub async fn mount<F, Fut>(filter: fn(&T, &str) -> bool, fetch: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let state = PageState::Loading.settle(fetch().await.map(Some));
        Self {
            state,
            search: String::new(),
            filter,
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Rows matching the current search term, in server order.
    pub fn visible(&self) -> Vec<&T> {
        let term = self.search.trim();
        self.state
            .loaded()
            .map(|rows| rows.iter().filter(|r| (self.filter)(r, term)).collect())
            .unwrap_or_default()
    }
}

/// Case-insensitive substring match over `"{first} {last}"` or the email.
/// An empty term matches everything.
pub fn client_matches(client: &Client, term: &str) -> bool {
    let term = term.to_lowercase();
    client.full_name().to_lowercase().contains(&term)
        || client.email.to_lowercase().contains(&term)
}

pub fn case_matches(case: &Case, term: &str) -> bool {
    let term = term.to_lowercase();
    case.title.to_lowercase().contains(&term)
        || case
            .case_number
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&term))
        || case.client_id.label().to_lowercase().contains(&term)
}

pub fn appointment_matches(appt: &Appointment, term: &str) -> bool {
    let term = term.to_lowercase();
    appt.title.to_lowercase().contains(&term)
        || appt.client_id.label().to_lowercase().contains(&term)
}

pub type ClientsPage = ListPage<Client>;
pub type CasesPage = ListPage<Case>;
pub type AppointmentsPage = ListPage<Appointment>;

impl ClientsPage {
    pub async fn load(api: &ApiClient) -> Self {
        Self::mount(client_matches, || api.list_clients()).await
    }

    /// Run `mutation`, then remount with a full refetch. The search term is kept.
    /// A failed mutation leaves the page as it was and returns the error.
    async fn mutate<Fut, R>(&mut self, api: &ApiClient, mutation: Fut) -> Result<R, ApiError>
    where
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let out = mutation.await?;
        let search = std::mem::take(&mut self.search);
        *self = Self::load(api).await;
        self.search = search;
        Ok(out)
    }

    pub async fn add(&mut self, api: &ApiClient, form: &ClientForm) -> Result<Client, ApiError> {
        self.mutate(api, api.create_client(form)).await
    }

    pub async fn edit(
        &mut self,
        api: &ApiClient,
        id: Uuid,
        form: &ClientForm,
    ) -> Result<Option<Client>, ApiError> {
        self.mutate(api, api.update_client(id, form)).await
    }

    pub async fn delete(&mut self, api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
        self.mutate(api, api.delete_client(id)).await
    }
}

impl CasesPage {
    pub async fn load(api: &ApiClient) -> Self {
        Self::mount(case_matches, || api.list_cases()).await
    }
}

impl AppointmentsPage {
    pub async fn load(api: &ApiClient) -> Self {
        Self::mount(appointment_matches, || api.list_appointments()).await
    }
}

/// A single-record page.
pub struct DetailPage<T> {
    pub id: Uuid,
    pub state: PageState<T>,
}

impl<T> DetailPage<T> {
    pub async fn mount<F, Fut>(id: Uuid, fetch: F) -> Self
    where
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<Option<T>, ApiError>>,
    {
        Self {
            id,
            state: PageState::Loading.settle(fetch(id).await),
        }
    }
}

pub async fn client_detail(api: &ApiClient, id: Uuid) -> DetailPage<Client> {
    DetailPage::mount(id, |id| api.get_client(id)).await
}

pub async fn case_detail(api: &ApiClient, id: Uuid) -> DetailPage<Case> {
    DetailPage::mount(id, |id| api.get_case(id)).await
}

pub async fn appointment_detail(api: &ApiClient, id: Uuid) -> DetailPage<Appointment> {
    DetailPage::mount(id, |id| api.get_appointment(id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn failure() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: Some("LAW_OFFICE_INTERNAL".into()),
            detail: Some("Internal error".into()),
        }
    }

    #[test]
    fn loading_settles_once() {
        let state = PageState::Loading.settle(Ok(Some(1)));
        assert_eq!(state, PageState::Loaded(1));
        assert_eq!(state.clone().settle(Ok(None)), PageState::Loaded(1));
        assert_eq!(state.settle(Err(failure())), PageState::Loaded(1));

        assert_eq!(PageState::<i32>::Loading.settle(Ok(None)), PageState::NotFound);
        assert!(matches!(
            PageState::<i32>::Loading.settle(Err(failure())),
            PageState::Error(msg) if msg.contains("Internal error")
        ));
    }

    #[tokio::test]
    async fn list_filter_applies_to_loaded_rows_only() {
        let mut page: ListPage<String> = ListPage::mount(
            |n: &String, term: &str| n.contains(term),
            || async { Ok(vec!["alpha".to_string(), "beta".to_string()]) },
        )
        .await;
        assert_eq!(page.visible().len(), 2);
        page.set_search(" al ");
        assert_eq!(page.visible(), vec![&"alpha".to_string()]);

        let failed: ListPage<String> =
            ListPage::mount(|_: &String, _: &str| true, || async { Err(failure()) }).await;
        assert!(failed.visible().is_empty());
        assert!(matches!(failed.state, PageState::Error(_)));
    }
}
