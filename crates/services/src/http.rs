use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;

use trainer_core::model::TestId;

use crate::api::{
    BackendApi, RecordQuestionRequest, RecordQuestionResponse, ResultsResponse,
    SaveCategoryRequest, SaveCategoryResponse, StartTestRequest, StartTestResponse,
    SubmitTestRequest, SubmitTestResponse,
};
use crate::error::ApiError;

/// `reqwest`-backed implementation of [`BackendApi`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ApiError>
    where
        Req: serde::Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn get_json<Resp>(&self, path: &str) -> Result<Resp, ApiError>
    where
        Resp: serde::de::DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn start_test(&self, req: &StartTestRequest) -> Result<StartTestResponse, ApiError> {
        self.post_json("/api/start-test", req).await
    }

    async fn record_question(
        &self,
        req: &RecordQuestionRequest,
    ) -> Result<RecordQuestionResponse, ApiError> {
        self.post_json("/api/record-question", req).await
    }

    async fn submit_test(&self, req: &SubmitTestRequest) -> Result<SubmitTestResponse, ApiError> {
        self.post_json("/api/record-test", req).await
    }

    async fn get_results(&self, id: &TestId) -> Result<ResultsResponse, ApiError> {
        self.get_json(&format!("/api/get-results/{id}")).await
    }

    async fn categories(&self) -> Result<BTreeMap<String, Vec<String>>, ApiError> {
        self.get_json("/api/categories").await
    }

    async fn save_category(
        &self,
        req: &SaveCategoryRequest,
    ) -> Result<SaveCategoryResponse, ApiError> {
        self.post_json("/api/save-category", req).await
    }

    async fn history(&self) -> Result<Vec<crate::api::HistoryRow>, ApiError> {
        self.get_json("/api/history").await
    }
}
