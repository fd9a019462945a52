//! Browser-local view of the conversation.
//!
//! All mutation goes through [`SessionState::reduce`], so the optimistic
//! append / patch / rollback cycle around an in-flight `ask` can be tested
//! without a browser.

use std::rc::Rc;

use crate::Conversation;

/// One query/response pair as shown in the chat pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub query: String,
    /// Empty while the answer is still being generated.
    pub response: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<Conversation> for Exchange {
    fn from(conversation: Conversation) -> Self {
        Self {
            query: conversation.query,
            response: conversation.response,
            timestamp: conversation.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The store was (re-)read for the current identity.
    Hydrated(Vec<Conversation>),
    InputChanged(String),
    Submitted { query: String, timestamp: i64 },
    Fulfilled { response: String },
    Failed { notice: String },
    NoticeDismissed,
    /// "Clear history" and "New chat". Never touches the store.
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    input: String,
    in_flight: bool,
    // Shared between snapshots; only copied when an exchange actually changes.
    exchanges: Rc<Vec<Exchange>>,
    // The last exchange is an optimistic placeholder for the in-flight query.
    placeholder: bool,
    notice: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The trimmed query to send, or `None` when a submit would be a no-op.
    pub fn ready_to_submit(&self) -> Option<String> {
        let query = self.input.trim();
        if query.is_empty() || self.in_flight {
            None
        } else {
            Some(query.to_owned())
        }
    }

    /// The last `limit` exchanges, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().rev().take(limit)
    }

    /// Applies one event. Returns `false` when the event was ignored.
    pub fn reduce(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Hydrated(conversations) => {
                if self.in_flight {
                    return false;
                }
                self.exchanges = Rc::new(conversations.into_iter().map(Exchange::from).collect());
                self.placeholder = false;
            }
            SessionEvent::InputChanged(input) => self.input = input,
            SessionEvent::Submitted { query, timestamp } => {
                let query = query.trim();
                if query.is_empty() || self.in_flight {
                    return false;
                }
                self.input.clear();
                self.in_flight = true;
                self.placeholder = true;
                self.notice = None;
                Rc::make_mut(&mut self.exchanges).push(Exchange {
                    query: query.to_owned(),
                    response: String::new(),
                    timestamp,
                });
            }
            SessionEvent::Fulfilled { response } => {
                if !self.in_flight {
                    return false;
                }
                if self.placeholder {
                    if let Some(last) = Rc::make_mut(&mut self.exchanges).last_mut() {
                        last.response = response;
                    }
                }
                self.in_flight = false;
                self.placeholder = false;
            }
            SessionEvent::Failed { notice } => {
                if !self.in_flight {
                    return false;
                }
                if self.placeholder {
                    Rc::make_mut(&mut self.exchanges).pop();
                }
                self.in_flight = false;
                self.placeholder = false;
                self.notice = Some(notice);
            }
            SessionEvent::NoticeDismissed => self.notice = None,
            SessionEvent::Cleared => {
                self.exchanges = Rc::default();
                self.placeholder = false;
            }
        }

        true
    }
}
