use crate::models::{Label, Resource, ResourceKind, Task, TodoList, User};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::debug;

/// A failed round-trip. Callers treat every variant the same way; the
/// distinction only shows up in the log line.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Typed client for the todo REST service. Cloning shares the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}/", self.base_url, kind.path())
    }

    fn item_url(&self, kind: ResourceKind, id: u64) -> String {
        format!("{}/{}/{}", self.base_url, kind.path(), id)
    }

    pub async fn list_all<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        let url = self.collection_url(R::KIND);
        debug!(%url, "GET collection");

        let res = self.client.get(&url).send().await?;
        let records = check(res).await?.json::<Vec<R>>().await?;

        Ok(records)
    }

    pub async fn get_by_id<R: Resource>(&self, id: u64) -> Result<R, ApiError> {
        let url = self.item_url(R::KIND, id);
        debug!(%url, "GET record");

        let res = self.client.get(&url).send().await?;
        let record = check(res).await?.json::<R>().await?;

        Ok(record)
    }

    pub async fn create<R: Resource>(&self, payload: &R::Create) -> Result<R, ApiError> {
        let url = self.collection_url(R::KIND);
        debug!(%url, "POST record");

        let res = self.client.post(&url).json(payload).send().await?;
        let record = check(res).await?.json::<R>().await?;

        Ok(record)
    }

    pub async fn update<R: Resource>(&self, id: u64, payload: &R::Update) -> Result<R, ApiError> {
        let url = self.item_url(R::KIND, id);
        debug!(%url, "PUT record");

        let res = self.client.put(&url).json(payload).send().await?;
        let record = check(res).await?.json::<R>().await?;

        Ok(record)
    }

    pub async fn delete<R: Resource>(&self, id: u64) -> Result<(), ApiError> {
        let url = self.item_url(R::KIND, id);
        debug!(%url, "DELETE record");

        let res = self.client.delete(&url).send().await?;
        check(res).await?;

        Ok(())
    }

    /// Loads a whole collection reduced to id/label pairs, for cross references.
    pub async fn labels(&self, kind: ResourceKind) -> Result<Vec<Label>, ApiError> {
        match kind {
            ResourceKind::Users => self.list_all::<User>().await.map(|r| to_labels(&r)),
            ResourceKind::Lists => self.list_all::<TodoList>().await.map(|r| to_labels(&r)),
            ResourceKind::Tasks => self.list_all::<Task>().await.map(|r| to_labels(&r)),
        }
    }
}

fn to_labels<R: Resource>(records: &[R]) -> Vec<Label> {
    records.iter().map(Label::of).collect()
}

async fn check(res: Response) -> Result<Response, ApiError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        let status = res.status();
        let body = res.text().await?;
        Err(ApiError::Status { status, body })
    }
}
