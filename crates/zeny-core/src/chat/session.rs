//! Conversation session for one mounted widget.
//!
//! `ConversationSession` owns the message log, the adopted conversation id,
//! and the lifecycle state of a single avatar mount. It is synchronous and
//! performs no IO: callers ask it for a ticketed request, run the network
//! call themselves, and hand the result back with the ticket. Results whose
//! ticket is no longer current (the session was torn down, or a newer
//! operation superseded it) are dropped.

use tracing::{debug, info, warn};

use zeny_types::avatar::Avatar;
use zeny_types::chat::Message;
use zeny_types::error::ApiError;
use zeny_types::exchange::{SendTurnRequest, TurnReply};
use zeny_types::id::{AvatarId, ConversationId};
use zeny_types::identity::VisitorId;

use super::state::{transition, SessionEvent, SessionState};

/// Shown as the only message when the avatar cannot be loaded.
pub const UNAVAILABLE_MESSAGE: &str = "Sorry, this chatbot is not available.";

/// Appended when a chat turn fails.
pub const EXCHANGE_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Client-side greeting that opens every session. Never sent to the backend.
pub fn greeting_for(name: &str) -> String {
    format!("Hi! I'm {name}. How can I help you today?")
}

/// Proof that a result belongs to the operation the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    sequence: u64,
}

/// An accepted submission: the request to send and the ticket to complete it.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub ticket: Ticket,
    pub request: SendTurnRequest,
}

/// Why a submission was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Empty or whitespace-only text.
    Blank,
    /// A previous turn has not resolved yet.
    Busy,
    /// The avatar has not finished loading.
    NotReady,
    /// The avatar could not be loaded; the session accepts no input.
    Unavailable,
    /// The session was torn down.
    Closed,
}

/// Result of [`ConversationSession::submit`].
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted(PendingTurn),
    Rejected(SubmitRejection),
}

/// Whether a completion was applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Stale or out-of-order result; the session was not touched.
    Ignored,
}

/// Client-held state of one widget mount.
#[derive(Debug)]
pub struct ConversationSession {
    avatar_id: AvatarId,
    visitor_id: VisitorId,
    avatar: Option<Avatar>,
    conversation_id: Option<ConversationId>,
    messages: Vec<Message>,
    state: SessionState,
    /// Bumped on teardown so tickets issued before it never match again.
    generation: u64,
    /// Bumped for every ticketed operation.
    sequence: u64,
}

impl ConversationSession {
    /// Create an uninitialized session for `avatar_id`.
    pub fn new(avatar_id: AvatarId, visitor_id: VisitorId) -> Self {
        Self {
            avatar_id,
            visitor_id,
            avatar: None,
            conversation_id: None,
            messages: Vec::new(),
            state: SessionState::Uninitialized,
            generation: 0,
            sequence: 0,
        }
    }

    pub fn avatar_id(&self) -> &AvatarId {
        &self.avatar_id
    }

    pub fn visitor_id(&self) -> &VisitorId {
        &self.visitor_id
    }

    /// Loaded avatar metadata, once available.
    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The adopted conversation id. `None` until the first successful turn.
    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn has_conversation(&self) -> bool {
        self.conversation_id.is_some()
    }

    /// The message log in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a turn is in flight.
    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Exchanging
    }

    /// Whether a submission would currently be accepted (given non-blank text).
    pub fn accepts_input(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Start loading the avatar. Returns `None` if the session was already
    /// mounted or torn down.
    pub fn begin_loading(&mut self) -> Option<Ticket> {
        if self.apply(SessionEvent::Mount) {
            Some(self.next_ticket())
        } else {
            None
        }
    }

    /// Apply a successful avatar fetch: seed the greeting and become ready.
    ///
    /// An inactive avatar cannot chat, so it is handled like a failed fetch.
    pub fn avatar_loaded(&mut self, ticket: Ticket, avatar: Avatar) -> Completion {
        if !self.is_current(ticket) {
            debug!(avatar_id = %self.avatar_id, "Dropping stale avatar response");
            return Completion::Ignored;
        }
        if !avatar.is_active {
            return self.avatar_failed(ticket, "avatar is inactive");
        }
        if !self.apply(SessionEvent::AvatarLoaded) {
            return Completion::Ignored;
        }

        self.messages.push(Message::avatar(greeting_for(&avatar.name)));
        self.avatar = Some(avatar);
        Completion::Applied
    }

    /// Apply a failed avatar fetch. The session becomes terminally unavailable.
    pub fn avatar_failed(&mut self, ticket: Ticket, reason: &str) -> Completion {
        if !self.is_current(ticket) {
            debug!(avatar_id = %self.avatar_id, "Dropping stale avatar failure");
            return Completion::Ignored;
        }
        if !self.apply(SessionEvent::AvatarFailed) {
            return Completion::Ignored;
        }

        warn!(avatar_id = %self.avatar_id, "Avatar unavailable: {reason}");
        self.messages.push(Message::system(UNAVAILABLE_MESSAGE));
        Completion::Applied
    }

    /// Submit visitor text.
    ///
    /// On acceptance the visitor message is appended immediately and the
    /// returned request carries the adopted conversation id, if any.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let rejection = match self.state {
            SessionState::Ready => None,
            SessionState::Exchanging => Some(SubmitRejection::Busy),
            SessionState::Uninitialized | SessionState::AvatarLoading => {
                Some(SubmitRejection::NotReady)
            }
            SessionState::Unavailable => Some(SubmitRejection::Unavailable),
            SessionState::Closed => Some(SubmitRejection::Closed),
        };
        if let Some(rejection) = rejection {
            debug!(state = %self.state, ?rejection, "Submission rejected");
            return SubmitOutcome::Rejected(rejection);
        }

        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected(SubmitRejection::Blank);
        }

        if !self.apply(SessionEvent::Submit) {
            return SubmitOutcome::Rejected(SubmitRejection::Busy);
        }

        self.messages.push(Message::visitor(text));
        let ticket = self.next_ticket();
        SubmitOutcome::Accepted(PendingTurn {
            ticket,
            request: SendTurnRequest {
                avatar_id: self.avatar_id.clone(),
                visitor_id: self.visitor_id.clone(),
                message: text.to_string(),
                conversation_id: self.conversation_id.clone(),
            },
        })
    }

    /// Apply the outcome of an exchange started by [`submit`](Self::submit).
    ///
    /// Success appends the avatar reply and adopts the conversation id if
    /// none was held. Failure appends one system message and keeps the id.
    pub fn complete_turn(
        &mut self,
        ticket: Ticket,
        result: Result<TurnReply, ApiError>,
    ) -> Completion {
        if self.state != SessionState::Exchanging || !self.is_current(ticket) {
            debug!(
                avatar_id = %self.avatar_id,
                state = %self.state,
                "Dropping stale exchange response"
            );
            return Completion::Ignored;
        }

        match result {
            Ok(reply) => {
                self.apply(SessionEvent::ExchangeSucceeded);
                match &self.conversation_id {
                    None => {
                        info!(
                            avatar_id = %self.avatar_id,
                            conversation_id = %reply.conversation_id,
                            "Adopted conversation"
                        );
                        self.conversation_id = Some(reply.conversation_id);
                    }
                    Some(adopted) if *adopted != reply.conversation_id => {
                        warn!(
                            adopted = %adopted,
                            returned = %reply.conversation_id,
                            "Backend returned a different conversation id, keeping the adopted one"
                        );
                    }
                    Some(_) => {}
                }
                self.messages.push(Message::avatar(reply.response_text));
            }
            Err(e) => {
                self.apply(SessionEvent::ExchangeFailed);
                warn!(avatar_id = %self.avatar_id, "Chat turn failed: {e}");
                self.messages.push(Message::system(EXCHANGE_ERROR_MESSAGE));
            }
        }
        Completion::Applied
    }

    /// Tear the session down. Any outstanding ticket becomes stale.
    pub fn teardown(&mut self) {
        if self.apply(SessionEvent::Teardown) {
            self.generation += 1;
        }
    }

    fn apply(&mut self, event: SessionEvent) -> bool {
        match transition(self.state, event) {
            Some(next) => {
                self.state = next;
                true
            }
            None => {
                debug!(state = %self.state, %event, "Ignoring event not allowed in current state");
                false
            }
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.sequence += 1;
        Ticket {
            generation: self.generation,
            sequence: self.sequence,
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && ticket.sequence == self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeny_types::chat::MessageRole;

    fn avatar(name: &str) -> Avatar {
        Avatar {
            id: AvatarId::new("av-1"),
            name: name.to_string(),
            personality_description: "Friendly".to_string(),
            is_active: true,
            user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn ready_session(name: &str) -> ConversationSession {
        let mut session =
            ConversationSession::new(AvatarId::new("av-1"), VisitorId("visitor_test".into()));
        let ticket = session.begin_loading().unwrap();
        assert_eq!(session.avatar_loaded(ticket, avatar(name)), Completion::Applied);
        session
    }

    fn accept(session: &mut ConversationSession, text: &str) -> PendingTurn {
        match session.submit(text) {
            SubmitOutcome::Accepted(pending) => pending,
            SubmitOutcome::Rejected(r) => panic!("unexpected rejection: {r:?}"),
        }
    }

    fn reply(text: &str, conversation: &str) -> Result<TurnReply, ApiError> {
        Ok(TurnReply {
            response_text: text.to_string(),
            conversation_id: ConversationId::new(conversation),
        })
    }

    #[test]
    fn test_greeting_seeded_on_load() {
        let session = ready_session("Alex");
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, MessageRole::Avatar);
        assert_eq!(
            session.messages()[0].content,
            "Hi! I'm Alex. How can I help you today?"
        );
        assert!(session.conversation_id().is_none());
    }

    #[test]
    fn test_alex_scenario() {
        let mut session = ready_session("Alex");

        let pending = accept(&mut session, "hello");
        assert_eq!(pending.request.message, "hello");
        assert!(pending.request.conversation_id.is_none());
        assert!(session.is_pending());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, MessageRole::Visitor);

        let applied = session.complete_turn(pending.ticket, reply("Nice to meet you!", "conv-1"));
        assert_eq!(applied, Completion::Applied);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].role, MessageRole::Avatar);
        assert_eq!(session.messages()[2].content, "Nice to meet you!");
        assert_eq!(session.conversation_id().map(|c| c.as_str()), Some("conv-1"));
    }

    #[test]
    fn test_greeting_never_part_of_request() {
        let mut session = ready_session("Alex");
        let pending = accept(&mut session, "hello");
        assert!(!pending.request.message.contains("Hi! I'm Alex"));
    }

    #[test]
    fn test_avatar_not_found_scenario() {
        let mut session =
            ConversationSession::new(AvatarId::new("missing"), VisitorId("visitor_test".into()));
        let ticket = session.begin_loading().unwrap();
        session.avatar_failed(ticket, "HTTP 404");

        assert_eq!(session.state(), SessionState::Unavailable);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, MessageRole::System);
        assert_eq!(session.messages()[0].content, "Sorry, this chatbot is not available.");

        assert!(matches!(
            session.submit("hello"),
            SubmitOutcome::Rejected(SubmitRejection::Unavailable)
        ));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_inactive_avatar_is_unavailable() {
        let mut session =
            ConversationSession::new(AvatarId::new("av-1"), VisitorId("visitor_test".into()));
        let ticket = session.begin_loading().unwrap();
        let mut inactive = avatar("Alex");
        inactive.is_active = false;

        session.avatar_loaded(ticket, inactive);

        assert_eq!(session.state(), SessionState::Unavailable);
        assert_eq!(session.messages()[0].content, UNAVAILABLE_MESSAGE);
        assert!(session.avatar().is_none());
    }

    #[test]
    fn test_blank_submission_is_noop() {
        let mut session = ready_session("Alex");
        for text in ["", "   ", "\n\t "] {
            assert!(matches!(
                session.submit(text),
                SubmitOutcome::Rejected(SubmitRejection::Blank)
            ));
        }
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_submission_text_is_trimmed() {
        let mut session = ready_session("Alex");
        let pending = accept(&mut session, "  hello there \n");
        assert_eq!(pending.request.message, "hello there");
        assert_eq!(session.messages()[1].content, "hello there");
    }

    #[test]
    fn test_submit_while_exchanging_is_noop() {
        let mut session = ready_session("Alex");
        let _pending = accept(&mut session, "first");
        let count = session.messages().len();

        assert!(matches!(
            session.submit("second"),
            SubmitOutcome::Rejected(SubmitRejection::Busy)
        ));
        assert_eq!(session.messages().len(), count);
    }

    #[test]
    fn test_submit_before_avatar_loaded_is_rejected() {
        let mut session =
            ConversationSession::new(AvatarId::new("av-1"), VisitorId("visitor_test".into()));
        assert!(matches!(
            session.submit("hi"),
            SubmitOutcome::Rejected(SubmitRejection::NotReady)
        ));
        session.begin_loading().unwrap();
        assert!(matches!(
            session.submit("hi"),
            SubmitOutcome::Rejected(SubmitRejection::NotReady)
        ));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_adopted_conversation_reused_in_later_requests() {
        let mut session = ready_session("Alex");
        let first = accept(&mut session, "one");
        session.complete_turn(first.ticket, reply("r1", "conv-1"));

        for text in ["two", "three", "four"] {
            let pending = accept(&mut session, text);
            assert_eq!(
                pending.request.conversation_id,
                Some(ConversationId::new("conv-1"))
            );
            session.complete_turn(pending.ticket, reply("ok", "conv-1"));
        }
    }

    #[test]
    fn test_failure_preserves_conversation_and_retry_attaches() {
        let mut session = ready_session("Alex");
        let first = accept(&mut session, "one");
        session.complete_turn(first.ticket, reply("r1", "conv-1"));

        let failing = accept(&mut session, "two");
        let before = session.messages().len();
        session.complete_turn(failing.ticket, Err(ApiError::Transport("timeout".into())));

        assert_eq!(session.messages().len(), before + 1);
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::System);
        assert_eq!(last.content, EXCHANGE_ERROR_MESSAGE);
        assert_eq!(session.conversation_id().map(|c| c.as_str()), Some("conv-1"));
        assert!(session.accepts_input());

        let retry = accept(&mut session, "two again");
        assert_eq!(retry.request.conversation_id, Some(ConversationId::new("conv-1")));
    }

    #[test]
    fn test_first_turn_failure_leaves_no_conversation() {
        let mut session = ready_session("Alex");
        let pending = accept(&mut session, "hello");
        session.complete_turn(
            pending.ticket,
            Err(ApiError::Rejected("success flag missing".into())),
        );

        assert!(session.conversation_id().is_none());
        let retry = accept(&mut session, "hello again");
        assert!(retry.request.conversation_id.is_none());
    }

    #[test]
    fn test_adopted_conversation_is_immutable() {
        let mut session = ready_session("Alex");
        let first = accept(&mut session, "one");
        session.complete_turn(first.ticket, reply("r1", "conv-1"));

        let second = accept(&mut session, "two");
        session.complete_turn(second.ticket, reply("r2", "conv-other"));

        assert_eq!(session.conversation_id().map(|c| c.as_str()), Some("conv-1"));
        assert_eq!(session.messages().last().unwrap().content, "r2");
    }

    #[test]
    fn test_late_response_after_teardown_is_ignored() {
        let mut session = ready_session("Alex");
        let pending = accept(&mut session, "hello");
        let count = session.messages().len();

        session.teardown();
        let applied = session.complete_turn(pending.ticket, reply("late", "conv-1"));

        assert_eq!(applied, Completion::Ignored);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.messages().len(), count);
        assert!(session.conversation_id().is_none());
    }

    #[test]
    fn test_late_avatar_response_after_teardown_is_ignored() {
        let mut session =
            ConversationSession::new(AvatarId::new("av-1"), VisitorId("visitor_test".into()));
        let ticket = session.begin_loading().unwrap();
        session.teardown();

        assert_eq!(session.avatar_loaded(ticket, avatar("Alex")), Completion::Ignored);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_reused_ticket_is_ignored() {
        let mut session = ready_session("Alex");
        let first = accept(&mut session, "one");
        session.complete_turn(first.ticket, reply("r1", "conv-1"));

        let _second = accept(&mut session, "two");
        let count = session.messages().len();
        assert_eq!(
            session.complete_turn(first.ticket, reply("dup", "conv-1")),
            Completion::Ignored
        );
        assert_eq!(session.messages().len(), count);
        assert!(session.is_pending());
    }

    #[test]
    fn test_begin_loading_twice_is_rejected() {
        let mut session =
            ConversationSession::new(AvatarId::new("av-1"), VisitorId("visitor_test".into()));
        assert!(session.begin_loading().is_some());
        assert!(session.begin_loading().is_none());
    }

    #[test]
    fn test_submit_after_teardown_is_rejected() {
        let mut session = ready_session("Alex");
        session.teardown();
        assert!(matches!(
            session.submit("hello"),
            SubmitOutcome::Rejected(SubmitRejection::Closed)
        ));
    }
}
