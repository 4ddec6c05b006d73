use std::future::Future;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::api::BOOKS_PATH;
use crate::models::{Book, BookUpdate, ErrorBody, ErrorMeta, NewBook};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("request to the books API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("books API rejected the request ({status}): {}", .body.message)]
    Rejected { status: StatusCode, body: ErrorBody },
}

impl ClientError {
    /// Fields named by a uniqueness conflict; empty for any other failure.
    pub fn conflict_fields(&self) -> &[String] {
        match self {
            ClientError::Rejected { body, .. } => body.meta.target.as_deref().unwrap_or_default(),
            ClientError::Transport(_) => &[],
        }
    }
}

/// Client-side view of the books endpoint.
pub trait BookApi {
    fn list(&self) -> impl Future<Output = Result<Vec<Book>, ClientError>>;

    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Book>, ClientError>>;

    fn create(&self, book: &NewBook) -> impl Future<Output = Result<Book, ClientError>>;

    fn update(&self, update: &BookUpdate) -> impl Future<Output = Result<Book, ClientError>>;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<Book, ClientError>>;
}

#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RestClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        RestClient {
            client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), BOOKS_PATH),
        }
    }

    fn with_id(&self, id: Uuid) -> String {
        format!("{}?id={}", self.endpoint, id)
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let bytes = response.bytes().await?;
    let body = rejection_body(status, &bytes);
    debug!("Books API answered {}: {:?}", status, body);
    Err(ClientError::Rejected { status, body })
}

/// Bodies that are not ours (a proxy page, plain text) keep only the status.
fn rejection_body(status: StatusCode, bytes: &[u8]) -> ErrorBody {
    serde_json::from_slice(bytes).unwrap_or_else(|_| ErrorBody {
        message: status.to_string(),
        meta: ErrorMeta::default(),
    })
}

impl BookApi for RestClient {
    async fn list(&self) -> Result<Vec<Book>, ClientError> {
        read(self.client.get(&self.endpoint).send().await?).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>, ClientError> {
        read(self.client.get(self.with_id(id)).send().await?).await
    }

    async fn create(&self, book: &NewBook) -> Result<Book, ClientError> {
        read(self.client.post(&self.endpoint).json(book).send().await?).await
    }

    async fn update(&self, update: &BookUpdate) -> Result<Book, ClientError> {
        read(self.client.put(&self.endpoint).json(update).send().await?).await
    }

    async fn delete(&self, id: Uuid) -> Result<Book, ClientError> {
        read(self.client.delete(self.with_id(id)).send().await?).await
    }
}
