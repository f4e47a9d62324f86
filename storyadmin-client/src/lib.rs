pub mod auth;
pub mod error;
pub mod media;
pub mod mock;
pub mod models;
pub mod pipeline;
pub mod resource;
pub mod schema;
pub mod session;
pub mod transport;

use std::sync::Arc;

pub use crate::{
    error::{ApiError, TransportError},
    models::{Author, Category, Chapter, Story},
    resource::{Listing, Payload, Resource, ResourceClient},
    session::Session,
};

use crate::{
    auth::AuthClient,
    media::MediaClient,
    pipeline::Pipeline,
    transport::{IsahcTransport, Transport},
};

/// Hands out clients that share one pipeline and therefore one session.
#[derive(Clone, Debug)]
pub struct Api {
    pipeline: Pipeline,
}

impl Api {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Session,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            pipeline: Pipeline::new(base_url, transport, session)?,
        })
    }

    /// Talks to the backend over isahc.
    pub fn connect(base_url: &str, session: Session) -> Result<Self, ApiError> {
        let transport = IsahcTransport::new()?;

        Self::new(base_url, Arc::new(transport), session)
    }

    pub fn session(&self) -> &Session {
        self.pipeline.session()
    }

    pub fn resource<R: Resource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.pipeline.clone())
    }

    pub fn stories(&self) -> ResourceClient<Story> {
        self.resource()
    }

    pub fn chapters(&self) -> ResourceClient<Chapter> {
        self.resource()
    }

    pub fn categories(&self) -> ResourceClient<Category> {
        self.resource()
    }

    pub fn authors(&self) -> ResourceClient<Author> {
        self.resource()
    }

    pub fn media(&self) -> MediaClient {
        MediaClient::new(self.pipeline.clone())
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.pipeline.clone())
    }
}
