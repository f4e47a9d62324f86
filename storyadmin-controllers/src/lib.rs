pub mod edit;
pub mod form;
pub mod guard;
pub mod list;
pub mod pager;
pub mod route;

use storyadmin_client::ApiError;

pub use crate::{
    edit::{EditForm, Phase, Submitted},
    form::{FormState, FormValue},
    guard::{Access, SessionGuard},
    list::{ListState, PaginatedList},
    pager::Pager,
    route::Route,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected by the pager, no request was made
    #[error("page {page} is outside 1..={total_pages}")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("form is not ready: {0}")]
    NotReady(&'static str),
}

impl ControlError {
    pub fn operator_message(&self) -> &'static str {
        match self {
            ControlError::Api(err) => err.operator_message(),
            ControlError::PageOutOfRange { .. } => "That page does not exist.",
            ControlError::NotReady(_) => "The form cannot be used right now.",
        }
    }
}
