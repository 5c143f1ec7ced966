use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{CreatePollRequest, ErrorResponse, Poll, PollApi, PollId, PollSummary, SyncError};

/// `PollApi` over the browser's fetch.
pub struct HttpPollApi {
    base_url: String,
}

impl HttpPollApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    pub async fn create_poll(&self, request: &CreatePollRequest) -> Result<Poll, SyncError> {
        let response = Request::post(&format!("{}/poll/create", self.base_url))
            .json(request)
            .map_err(|e| SyncError::Transient(e.to_string()))?
            .send()
            .await
            .map_err(|e| SyncError::Transient(e.to_string()))?;
        read_json(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let response = Request::get(&format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| SyncError::Transient(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    match response.status() {
        200..=299 => response.json::<T>().await
            .map_err(|e| SyncError::Transient(format!("Failed to parse response: {e}"))),
        status => {
            let fallback = response.status_text();
            let message = response.json::<ErrorResponse>().await
                .map(|err| err.error)
                .unwrap_or(fallback);
            Err(SyncError::rejection(status, message))
        }
    }
}

impl PollApi for HttpPollApi {
    async fn list_polls(&self) -> Result<Vec<PollSummary>, SyncError> {
        self.get("/polls").await
    }

    async fn get_poll(&self, id: PollId) -> Result<Poll, SyncError> {
        self.get(&format!("/poll/{id}")).await
    }

    async fn cast_vote(&self, id: PollId, option: usize) -> Result<Poll, SyncError> {
        let response = Request::post(&format!("{}/poll/{id}/vote/{option}", self.base_url))
            .send()
            .await
            .map_err(|e| SyncError::Transient(e.to_string()))?;
        read_json(response).await
    }
}
