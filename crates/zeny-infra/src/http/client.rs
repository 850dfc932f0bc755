//! HttpApiClient -- the backend API over HTTP/JSON.
//!
//! One client implements every backend port in `zeny-core`: avatar lookup,
//! chat turns, conversation review, and registry management. Responses are
//! mapped onto [`ApiError`]:
//!
//! - connection failures and timeouts become `Transport`
//! - 404 becomes `NotFound` with the backend's `detail`
//! - any other non-2xx becomes `Status`
//! - a 2xx body without the expected success indicator becomes `Rejected`

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use zeny_core::chat::backend::{AvatarSource, TurnExchange};
use zeny_core::registry::repository::AvatarRegistry;
use zeny_core::review::repository::ConversationReview;
use zeny_types::avatar::{
    Acknowledgement, Avatar, CreateAvatarRequest, TrainingDocument, UpdateAvatarRequest,
    UploadDocumentRequest,
};
use zeny_types::chat::ConversationRecord;
use zeny_types::config::ClientConfig;
use zeny_types::error::ApiError;
use zeny_types::exchange::{
    ErrorBody, HealthResponse, SendTurnRequest, SendTurnResponse, SummaryResponse, TurnReply,
};
use zeny_types::id::{AvatarId, ConversationId, DocumentId};

#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Build a client for `config.api_base_url` with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.api_base_url.trim_end_matches('/')).map_err(|e| {
            ApiError::Transport(format!("invalid API base URL '{}': {e}", config.api_base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "invalid API base URL '{}'",
                config.api_base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay within their own segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and decode a 2xx JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail_text())
                .unwrap_or(body);
            tracing::debug!(status = status.as_u16(), detail = %detail, "Backend returned an error");
            return Err(match status {
                StatusCode::NOT_FOUND => ApiError::NotFound(detail),
                _ => ApiError::Status {
                    status: status.as_u16(),
                    detail,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn acknowledge(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let ack: Acknowledgement = self.execute(request).await?;
        if !ack.success {
            return Err(ApiError::Rejected(
                ack.message.unwrap_or_else(|| "request not acknowledged".to_string()),
            ));
        }
        Ok(())
    }

    /// `GET /` -- liveness of the backend.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.execute(self.client.get(self.url(&[""]))).await
    }
}

impl AvatarSource for HttpApiClient {
    #[tracing::instrument(name = "fetch_avatar", skip(self), fields(avatar_id = %avatar_id))]
    async fn fetch_avatar(&self, avatar_id: &AvatarId) -> Result<Avatar, ApiError> {
        self.execute(self.client.get(self.url(&["avatars", avatar_id.as_str()])))
            .await
    }
}

impl TurnExchange for HttpApiClient {
    #[tracing::instrument(
        name = "send_turn",
        skip(self, request),
        fields(
            avatar_id = %request.avatar_id,
            continuing = request.conversation_id.is_some(),
        )
    )]
    async fn send_turn(&self, request: &SendTurnRequest) -> Result<TurnReply, ApiError> {
        let body: SendTurnResponse = self
            .execute(self.client.post(self.url(&["chat", "avatar"])).json(request))
            .await?;

        if !body.success {
            return Err(ApiError::Rejected("response did not indicate success".to_string()));
        }
        let response_text = body
            .response
            .ok_or_else(|| ApiError::Rejected("response text missing".to_string()))?;
        let conversation_id = body
            .conversation_id
            .ok_or_else(|| ApiError::Rejected("conversation id missing".to_string()))?;

        Ok(TurnReply {
            response_text,
            conversation_id,
        })
    }
}

impl ConversationReview for HttpApiClient {
    #[tracing::instrument(name = "list_conversations", skip(self), fields(avatar_id = %avatar_id))]
    async fn list_conversations(
        &self,
        avatar_id: &AvatarId,
    ) -> Result<Vec<ConversationRecord>, ApiError> {
        self.execute(
            self.client
                .get(self.url(&["avatars", avatar_id.as_str(), "conversations"])),
        )
        .await
    }

    #[tracing::instrument(
        name = "summarize_conversation",
        skip(self),
        fields(conversation_id = %conversation_id)
    )]
    async fn summarize(&self, conversation_id: &ConversationId) -> Result<String, ApiError> {
        let body: SummaryResponse = self
            .execute(
                self.client
                    .post(self.url(&["conversations", conversation_id.as_str(), "summarize"])),
            )
            .await?;

        if !body.success {
            return Err(ApiError::Rejected("summary not generated".to_string()));
        }
        body.summary
            .ok_or_else(|| ApiError::Rejected("summary text missing".to_string()))
    }
}

impl AvatarRegistry for HttpApiClient {
    #[tracing::instrument(name = "list_avatars", skip(self))]
    async fn list_avatars(&self) -> Result<Vec<Avatar>, ApiError> {
        self.execute(self.client.get(self.url(&["avatars"]))).await
    }

    #[tracing::instrument(name = "create_avatar", skip(self, request), fields(name = %request.name))]
    async fn create_avatar(&self, request: &CreateAvatarRequest) -> Result<Avatar, ApiError> {
        self.execute(self.client.post(self.url(&["avatars"])).json(request))
            .await
    }

    #[tracing::instrument(name = "update_avatar", skip(self, request), fields(avatar_id = %avatar_id))]
    async fn update_avatar(
        &self,
        avatar_id: &AvatarId,
        request: &UpdateAvatarRequest,
    ) -> Result<Avatar, ApiError> {
        self.execute(
            self.client
                .put(self.url(&["avatars", avatar_id.as_str()]))
                .json(request),
        )
        .await
    }

    #[tracing::instrument(name = "delete_avatar", skip(self), fields(avatar_id = %avatar_id))]
    async fn delete_avatar(&self, avatar_id: &AvatarId) -> Result<(), ApiError> {
        self.acknowledge(self.client.delete(self.url(&["avatars", avatar_id.as_str()])))
            .await
    }

    #[tracing::instrument(name = "list_documents", skip(self), fields(avatar_id = %avatar_id))]
    async fn list_documents(&self, avatar_id: &AvatarId) -> Result<Vec<TrainingDocument>, ApiError> {
        self.execute(
            self.client
                .get(self.url(&["avatars", avatar_id.as_str(), "documents"])),
        )
        .await
    }

    #[tracing::instrument(
        name = "upload_document",
        skip(self, request),
        fields(avatar_id = %avatar_id, filename = %request.filename)
    )]
    async fn upload_document(
        &self,
        avatar_id: &AvatarId,
        request: &UploadDocumentRequest,
    ) -> Result<TrainingDocument, ApiError> {
        self.execute(
            self.client
                .post(self.url(&["avatars", avatar_id.as_str(), "documents"]))
                .json(request),
        )
        .await
    }

    #[tracing::instrument(name = "delete_document", skip(self), fields(document_id = %document_id))]
    async fn delete_document(&self, document_id: &DocumentId) -> Result<(), ApiError> {
        self.acknowledge(
            self.client
                .delete(self.url(&["documents", document_id.as_str()])),
        )
        .await
    }
}
