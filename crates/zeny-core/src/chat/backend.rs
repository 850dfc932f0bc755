//! Backend ports used by the chat widget.
//!
//! Implementations live in zeny-infra (e.g., `HttpApiClient`).

use zeny_types::avatar::Avatar;
use zeny_types::error::ApiError;
use zeny_types::exchange::{SendTurnRequest, TurnReply};
use zeny_types::id::AvatarId;

/// Fetches avatar metadata for the widget greeting.
pub trait AvatarSource: Send + Sync {
    /// Fetch one avatar. A missing avatar is `ApiError::NotFound`.
    fn fetch_avatar(
        &self,
        avatar_id: &AvatarId,
    ) -> impl std::future::Future<Output = Result<Avatar, ApiError>> + Send;
}

/// Sends one visitor turn and returns the avatar's reply.
///
/// No idempotency key is sent: retrying after a timeout may record the
/// visitor turn twice on the server.
pub trait TurnExchange: Send + Sync {
    /// Send `request.message` and wait for the reply.
    ///
    /// Callers validate that the message is non-blank. Any response that
    /// is not an explicit success is returned as an error.
    fn send_turn(
        &self,
        request: &SendTurnRequest,
    ) -> impl std::future::Future<Output = Result<TurnReply, ApiError>> + Send;
}
