use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

use storyadmin_client::{ApiError, Resource, ResourceClient};

use crate::{pager::Pager, ControlError};

#[derive(Clone, Debug, PartialEq)]
pub struct ListState<R> {
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: u64,
    pub items: Vec<R>,
    pub filter: Option<String>,
    /// Failure of the latest fetch, the rows above are from the last success
    pub last_error: Option<ApiError>,
}

/// Drives one list screen.
///
/// Every fetch takes a ticket from a counter; when it resolves, it only
/// touches the state if no later fetch has been issued since, so a slow
/// answer for an old page can never overwrite a newer one.
pub struct PaginatedList<R: Resource> {
    client: ResourceClient<R>,
    page_size: usize,
    state: Mutex<ListState<R>>,
    sequence: AtomicU64,
}

impl<R: Resource> PaginatedList<R> {
    pub fn new(client: ResourceClient<R>, page_size: usize) -> Self {
        let page_size = page_size.max(1);

        Self {
            client,
            page_size,
            state: Mutex::new(ListState {
                current_page: 1,
                page_size,
                total_pages: 1,
                total: 0,
                items: Vec::new(),
                filter: None,
                last_error: None,
            }),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ListState<R> {
        self.lock().clone()
    }

    pub fn pager(&self) -> Pager {
        let state = self.lock();

        Pager::new(state.current_page, state.total_pages)
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn mount(&self) -> Result<(), ControlError> {
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<(), ControlError> {
        let (page, filter) = {
            let state = self.lock();

            (state.current_page, state.filter.clone())
        };

        self.fetch(page, filter).await
    }

    /// Page 1 is always reachable so an empty list can be reloaded.
    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn go_to(&self, page: usize) -> Result<(), ControlError> {
        let filter = {
            let state = self.lock();

            if page < 1 || (page > state.total_pages && page != 1) {
                return Err(ControlError::PageOutOfRange {
                    page,
                    total_pages: state.total_pages,
                });
            }

            state.filter.clone()
        };

        self.fetch(page, filter).await
    }

    pub async fn next(&self) -> Result<(), ControlError> {
        let page = self.lock().current_page;

        self.go_to(page + 1).await
    }

    pub async fn previous(&self) -> Result<(), ControlError> {
        let page = self.lock().current_page;

        self.go_to(page.saturating_sub(1)).await
    }

    /// Replaces the filter and starts over from page 1; blank terms clear it.
    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn set_filter(&self, term: &str) -> Result<(), ControlError> {
        let term = term.trim();
        let filter = (!term.is_empty()).then(|| term.to_string());

        self.fetch(1, filter).await
    }

    /// Deletes a row and drops it from the current page.
    #[tracing::instrument(skip(self), fields(resource = R::PATH), err)]
    pub async fn remove(&self, id: &str) -> Result<(), ControlError> {
        match self.client.remove(id).await {
            Ok(_) => {
                let mut state = self.lock();
                state.items.retain(|item| item.id() != id);
                state.last_error = None;

                Ok(())
            }
            Err(err) => {
                self.lock().last_error = Some(err.clone());

                Err(err.into())
            }
        }
    }

    /// Page and filter only become current together with the rows they produced.
    async fn fetch(&self, page: usize, filter: Option<String>) -> Result<(), ControlError> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self
            .client
            .list(page, self.page_size, filter.as_deref())
            .await;

        let mut state = self.lock();

        if self.sequence.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, page, "dropping answer of a superseded fetch");

            return Ok(());
        }

        match result {
            Ok(listing) => {
                state.current_page = page;
                state.filter = filter;
                state.items = listing.items;
                state.total = listing.total;
                state.total_pages = listing.total_pages;
                state.last_error = None;

                Ok(())
            }
            Err(err) => {
                tracing::error!(err = %err, page, "unable to fetch page, keeping previous rows");

                state.last_error = Some(err.clone());

                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState<R>> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
