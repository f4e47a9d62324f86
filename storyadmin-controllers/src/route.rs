use std::fmt;

use storyadmin_client::Resource;

/// Admin screens a controller can send the operator to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Edit {
        resource: &'static str,
        key: &'static str,
        id: String,
    },
}

impl Route {
    pub fn edit<R: Resource>(id: &str) -> Self {
        Route::Edit {
            resource: R::PATH,
            key: R::ROUTE_KEY,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::SignIn => write!(f, "/auth/signin"),
            Route::Edit { resource, key, id } => {
                let query = serde_urlencoded::to_string([(key, id)]).map_err(|_| fmt::Error)?;

                write!(f, "/{}/edit?{}", resource, query)
            }
        }
    }
}
