//! Async driver for a mounted chat widget.
//!
//! `ChatWidget` couples a [`ConversationSession`] with a backend and runs
//! the network half of each transition. The session sits behind a mutex
//! that is never held across an await, so a front-end can render the log
//! (including the optimistic visitor message) while a turn is in flight.
//!
//! Unmounting cancels the widget's token: any in-flight wait is abandoned
//! and the session is torn down, so a late response can never mutate it.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use zeny_types::avatar::Avatar;
use zeny_types::chat::Message;
use zeny_types::error::ApiError;
use zeny_types::exchange::TurnReply;
use zeny_types::id::{AvatarId, ConversationId};
use zeny_types::identity::VisitorId;

use super::backend::{AvatarSource, TurnExchange};
use super::session::{Completion, ConversationSession, SubmitOutcome, SubmitRejection, Ticket};
use super::state::SessionState;

/// What happened to a call to [`ChatWidget::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The turn resolved and the log now ends with the avatar reply.
    Replied,
    /// The turn failed and the log now ends with a system error message.
    Failed,
    /// Nothing was sent; the log is unchanged.
    Rejected(SubmitRejection),
    /// The widget was unmounted while the turn was in flight.
    Dropped,
}

/// One widget mount for one avatar.
pub struct ChatWidget<B> {
    backend: Arc<B>,
    session: Arc<Mutex<ConversationSession>>,
    cancel: CancellationToken,
}

impl<B> ChatWidget<B>
where
    B: AvatarSource + TurnExchange,
{
    /// Mount a widget for `avatar_id`: fetch the avatar and seed the log.
    ///
    /// Never fails. If the avatar cannot be fetched the widget is mounted
    /// in the terminal unavailable state.
    pub async fn mount(backend: Arc<B>, avatar_id: AvatarId, visitor_id: VisitorId) -> Self {
        let widget = Self {
            backend,
            session: Arc::new(Mutex::new(ConversationSession::new(
                avatar_id.clone(),
                visitor_id,
            ))),
            cancel: CancellationToken::new(),
        };

        let Some(ticket) = widget.lock().begin_loading() else {
            return widget;
        };

        let fetched = widget.backend.fetch_avatar(&avatar_id).await;

        let mut session = widget.lock();
        match fetched {
            Ok(avatar) => session.avatar_loaded(ticket, avatar),
            Err(e) => session.avatar_failed(ticket, &e.to_string()),
        };
        drop(session);

        widget
    }

    /// Submit visitor text and wait for the turn to resolve.
    ///
    /// Blank text, or a submission while another turn is in flight, is
    /// rejected without touching the log or calling the backend.
    ///
    /// Dropping the returned future before it resolves fails the turn, so
    /// the session accepts input again.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let pending = match self.lock().submit(text) {
            SubmitOutcome::Accepted(pending) => pending,
            SubmitOutcome::Rejected(rejection) => return SendOutcome::Rejected(rejection),
        };
        let guard = TurnGuard {
            session: &self.session,
            ticket: Some(pending.ticket),
        };

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Widget unmounted while a turn was in flight");
                return SendOutcome::Dropped;
            }
            result = self.backend.send_turn(&pending.request) => result,
        };

        let failed = result.is_err();
        match guard.complete(result) {
            Completion::Ignored => SendOutcome::Dropped,
            Completion::Applied if failed => SendOutcome::Failed,
            Completion::Applied => SendOutcome::Replied,
        }
    }

    /// Unmount the widget. In-flight work is abandoned and the session
    /// becomes inert.
    pub fn unmount(&self) {
        self.cancel.cancel();
        self.lock().teardown();
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    /// Messages appended after the first `from` entries.
    pub fn messages_since(&self, from: usize) -> Vec<Message> {
        self.lock().messages().iter().skip(from).cloned().collect()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.lock().conversation_id().cloned()
    }

    /// The loaded avatar, once the session has left the loading state.
    pub fn avatar(&self) -> Option<Avatar> {
        self.lock().avatar().cloned()
    }

    pub fn avatar_name(&self) -> Option<String> {
        self.lock().avatar().map(|a| a.name.clone())
    }

    pub fn accepts_input(&self) -> bool {
        self.lock().accepts_input()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    fn lock(&self) -> MutexGuard<'_, ConversationSession> {
        lock_session(&self.session)
    }
}

fn lock_session(session: &Mutex<ConversationSession>) -> MutexGuard<'_, ConversationSession> {
    // Every mutation under the lock is a single push or assignment, so
    // a poisoned session is still consistent.
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds an accepted turn's ticket until the backend call resolves.
///
/// If `send` is dropped first, the turn is completed as a transport failure.
/// After teardown the ticket is stale and completion is a no-op.
struct TurnGuard<'a> {
    session: &'a Mutex<ConversationSession>,
    ticket: Option<Ticket>,
}

impl TurnGuard<'_> {
    fn complete(mut self, result: Result<TurnReply, ApiError>) -> Completion {
        match self.ticket.take() {
            Some(ticket) => lock_session(self.session).complete_turn(ticket, result),
            None => Completion::Ignored,
        }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let completion = lock_session(self.session)
                .complete_turn(ticket, Err(ApiError::Transport("request cancelled".to_string())));
            debug!(?completion, "Turn abandoned before the backend replied");
        }
    }
}

impl<B> Drop for ChatWidget<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;
    use zeny_types::chat::MessageRole;
    use zeny_types::exchange::SendTurnRequest;

    /// Scripted backend. Turns block on `gate` when `hold_turns` is set.
    #[derive(Default)]
    struct FakeBackend {
        avatar_missing: bool,
        fail_turns: std::sync::atomic::AtomicBool,
        hold_turns: bool,
        gate: Notify,
        entered: Notify,
        calls: AtomicUsize,
        requests: Mutex<Vec<SendTurnRequest>>,
    }

    impl AvatarSource for FakeBackend {
        async fn fetch_avatar(&self, avatar_id: &AvatarId) -> Result<Avatar, ApiError> {
            if self.avatar_missing {
                return Err(ApiError::NotFound("Avatar not found".into()));
            }
            Ok(Avatar {
                id: avatar_id.clone(),
                name: "Alex".to_string(),
                personality_description: "Helpful".to_string(),
                is_active: true,
                user_id: None,
                created_at: None,
                updated_at: None,
            })
        }
    }

    impl TurnExchange for FakeBackend {
        async fn send_turn(&self, request: &SendTurnRequest) -> Result<TurnReply, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.requests.lock().unwrap().push(request.clone());
            if self.hold_turns {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            if self.fail_turns.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: 500,
                    detail: "Failed to generate response".into(),
                });
            }
            Ok(TurnReply {
                response_text: format!("reply {n}"),
                conversation_id: request
                    .conversation_id
                    .clone()
                    .unwrap_or_else(|| ConversationId::new("conv-1")),
            })
        }
    }

    async fn mount(backend: FakeBackend) -> (Arc<FakeBackend>, ChatWidget<FakeBackend>) {
        let backend = Arc::new(backend);
        let widget = ChatWidget::mount(
            backend.clone(),
            AvatarId::new("av-1"),
            VisitorId("visitor_test".into()),
        )
        .await;
        (backend, widget)
    }

    #[tokio::test]
    async fn test_mount_seeds_greeting() {
        let (backend, widget) = mount(FakeBackend::default()).await;
        assert_eq!(widget.state(), SessionState::Ready);
        let messages = widget.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Hi! I'm Alex. How can I help you today?");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(widget.avatar_name().as_deref(), Some("Alex"));
    }

    #[tokio::test]
    async fn test_mount_missing_avatar_is_unavailable() {
        let (backend, widget) = mount(FakeBackend {
            avatar_missing: true,
            ..Default::default()
        })
        .await;

        assert_eq!(widget.state(), SessionState::Unavailable);
        assert_eq!(
            widget.send("hello").await,
            SendOutcome::Rejected(SubmitRejection::Unavailable)
        );
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role, MessageRole::System);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_adopts_and_reuses_conversation() {
        let (backend, widget) = mount(FakeBackend::default()).await;

        assert_eq!(widget.send("hello").await, SendOutcome::Replied);
        assert_eq!(widget.conversation_id(), Some(ConversationId::new("conv-1")));
        assert_eq!(widget.send("again").await, SendOutcome::Replied);

        let requests = backend.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].conversation_id.is_none());
        assert_eq!(requests[1].conversation_id, Some(ConversationId::new("conv-1")));
        assert_eq!(widget.messages().len(), 5);
    }

    #[tokio::test]
    async fn test_blank_send_never_calls_backend() {
        let (backend, widget) = mount(FakeBackend::default()).await;
        assert_eq!(
            widget.send("   ").await,
            SendOutcome::Rejected(SubmitRejection::Blank)
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(widget.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_conversation() {
        let (backend, widget) = mount(FakeBackend::default()).await;
        widget.send("hello").await;

        backend.fail_turns.store(true, Ordering::SeqCst);
        assert_eq!(widget.send("boom").await, SendOutcome::Failed);
        assert_eq!(widget.conversation_id(), Some(ConversationId::new("conv-1")));
        assert_eq!(widget.messages().last().unwrap().role, MessageRole::System);

        backend.fail_turns.store(false, Ordering::SeqCst);
        assert_eq!(widget.send("retry").await, SendOutcome::Replied);
        let requests = backend.requests.lock().unwrap().clone();
        assert_eq!(requests[2].conversation_id, Some(ConversationId::new("conv-1")));
    }

    #[tokio::test]
    async fn test_concurrent_send_is_rejected() {
        let (backend, widget) = mount(FakeBackend {
            hold_turns: true,
            ..Default::default()
        })
        .await;
        let widget = Arc::new(widget);

        let first = {
            let widget = widget.clone();
            tokio::spawn(async move { widget.send("first").await })
        };
        backend.entered.notified().await;

        // Visitor message is already visible while the turn is in flight.
        assert!(widget.is_pending());
        assert_eq!(widget.messages().len(), 2);

        assert_eq!(
            widget.send("second").await,
            SendOutcome::Rejected(SubmitRejection::Busy)
        );
        assert_eq!(widget.messages().len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        backend.gate.notify_one();
        assert_eq!(first.await.unwrap(), SendOutcome::Replied);
        assert_eq!(widget.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_abandoned_send_frees_the_session() {
        let (backend, widget) = mount(FakeBackend {
            hold_turns: true,
            ..Default::default()
        })
        .await;

        let timed_out = tokio::time::timeout(Duration::from_millis(50), widget.send("hello")).await;
        assert!(timed_out.is_err());

        assert_eq!(widget.state(), SessionState::Ready);
        assert!(!widget.is_pending());
        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, MessageRole::System);
        assert!(widget.conversation_id().is_none());

        backend.gate.notify_one();
        assert_eq!(widget.send("again").await, SendOutcome::Replied);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(widget.messages().len(), 5);
    }

    #[tokio::test]
    async fn test_unmount_drops_in_flight_turn() {
        let (backend, widget) = mount(FakeBackend {
            hold_turns: true,
            ..Default::default()
        })
        .await;
        let widget = Arc::new(widget);

        let in_flight = {
            let widget = widget.clone();
            tokio::spawn(async move { widget.send("hello").await })
        };
        backend.entered.notified().await;

        widget.unmount();
        backend.gate.notify_one();

        let outcome = tokio::time::timeout(Duration::from_secs(1), in_flight)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SendOutcome::Dropped);
        assert_eq!(widget.state(), SessionState::Closed);
        assert_eq!(widget.messages().len(), 2);
        assert!(widget.conversation_id().is_none());
    }
}
