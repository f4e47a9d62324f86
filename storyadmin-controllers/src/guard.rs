use storyadmin_client::Session;

use crate::route::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Unchecked,
    Authorized,
    Unauthorized,
}

/// Gate in front of every admin page.
///
/// Only checks that a token is present; whether the backend still accepts it
/// is found out by the first request that comes back 401.
#[derive(Debug)]
pub struct SessionGuard {
    session: Session,
    access: Access,
}

impl SessionGuard {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            access: Access::Unchecked,
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn check(&mut self) -> Access {
        if self.access == Access::Unchecked {
            self.access = if self.session.is_present() {
                Access::Authorized
            } else {
                Access::Unauthorized
            };

            tracing::debug!(access = ?self.access, "session checked");
        }

        self.access
    }

    /// Renders `page` when signed in, otherwise hands back the sign-in route.
    pub fn enter<T>(&mut self, page: impl FnOnce() -> T) -> Result<T, Route> {
        match self.check() {
            Access::Authorized => Ok(page()),
            _ => {
                tracing::info!("not signed in, redirecting");

                Err(Route::SignIn)
            }
        }
    }

    /// Forgets the last decision, the next entry checks again.
    pub fn reset(&mut self) {
        self.access = Access::Unchecked;
    }
}
