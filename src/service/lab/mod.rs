pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::base::types::{Language, TaskKind};

// Types.

/// Failure modes when relaying a document to the Lab Reader API.
///
/// The split matters to the interaction layer: an API rejection carries a
/// `detail` the user should see, while a transport failure gets a generic
/// "service unreachable" reply.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("lab api rejected the document ({status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("failed to reach the lab api: {0}")]
    Transport(#[from] reqwest::Error),
}

// Traits.

/// Generic Lab Reader API client trait that clients must implement.
///
/// Implementing this trait allows the document pipeline to be exercised
/// against mock backends in tests.
#[async_trait]
pub trait GenericLabClient: Send + Sync + 'static {
    /// Submit a document for reading and return the analysis text.
    ///
    /// The task selects the API endpoint and the language is passed through as
    /// a query parameter; the file travels as a multipart upload.
    async fn read_document(&self, task: TaskKind, language: Language, file_name: &str, bytes: Vec<u8>) -> Result<String, LabError>;
}

// Structs.

/// Lab Reader API client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LabClient {
    inner: Arc<dyn GenericLabClient>,
}

impl Deref for LabClient {
    type Target = dyn GenericLabClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LabClient {
    /// Wrap an existing client implementation (used by tests to inject mocks).
    pub fn new(inner: Arc<dyn GenericLabClient>) -> Self {
        Self { inner }
    }
}
