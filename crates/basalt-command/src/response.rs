//! Response-request correlation.
//!
//! A command can prompt an actor for a follow-up response such as `/y`
//! or `/n`. Pending prompts are tracked per actor; incoming lines are
//! checked against them before normal command handling runs. Several
//! prompts may be pending for one actor at once, disambiguated by a
//! context label.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Marker character a response line must start with.
pub const RESPONSE_MARKER: char = '/';

/// The closed set of response kinds an actor can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    Confirm,
    Deny,
    Accept,
    Decline,
    Ok,
    Cancel,
}

const ALL_RESPONSE_TYPES: [ResponseType; 6] = [
    ResponseType::Confirm,
    ResponseType::Deny,
    ResponseType::Accept,
    ResponseType::Decline,
    ResponseType::Ok,
    ResponseType::Cancel,
];

impl ResponseType {
    /// The token an actor types for this response, without the marker.
    pub fn command_name(self) -> &'static str {
        match self {
            ResponseType::Confirm => "y",
            ResponseType::Deny => "n",
            ResponseType::Accept => "accept",
            ResponseType::Decline => "decline",
            ResponseType::Ok => "ok",
            ResponseType::Cancel => "cancel",
        }
    }

    /// Case-insensitive lookup of a response token.
    pub fn from_command_name(token: &str) -> Option<Self> {
        ALL_RESPONSE_TYPES
            .iter()
            .copied()
            .find(|t| t.command_name().eq_ignore_ascii_case(token))
    }

    /// Every response kind.
    pub fn all() -> &'static [ResponseType] {
        &ALL_RESPONSE_TYPES
    }
}

/// One-shot handler invoked with the response kind the actor sent.
pub type ResponseFn = Box<dyn FnOnce(ResponseType) + Send>;

/// Identifier for a pending request, used by the issuer to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

struct ResponseRequest {
    id: u64,
    context: String,
    accepted: Vec<ResponseType>,
    handler: Option<ResponseFn>,
}

/// Outcome of feeding a message line to the tracker.
#[derive(Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The line is not a response; continue normal command handling.
    NotHandled,
    /// The line was consumed; any messages go back to the actor.
    Handled { messages: Vec<String> },
}

enum Decision {
    Deliver(usize),
    Listing(Vec<String>),
}

/// Tracks pending response requests per actor.
///
/// Cheap to clone; clones share the same request table.
#[derive(Clone, Default)]
pub struct ResponseTracker {
    inner: Arc<Mutex<TrackerState>>,
}

#[derive(Default)]
struct TrackerState {
    next_id: u64,
    requests: HashMap<String, Vec<ResponseRequest>>,
}

impl ResponseTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask `actor` for one of `accepted`, under a disambiguation
    /// context label. The handler runs once, when a matching response
    /// is delivered.
    pub fn request(
        &self,
        actor: &str,
        context: &str,
        accepted: &[ResponseType],
        handler: impl FnOnce(ResponseType) + Send + 'static,
    ) -> RequestId {
        let mut state = self.inner.lock();
        state.next_id += 1;
        let id = state.next_id;

        state
            .requests
            .entry(actor.to_string())
            .or_default()
            .push(ResponseRequest {
                id,
                context: context.to_string(),
                accepted: accepted.to_vec(),
                handler: Some(Box::new(handler)),
            });

        debug!("response request {id} for {actor} ({context})");
        RequestId(id)
    }

    /// Cancel a pending request. No-op if it was already delivered.
    pub fn cancel(&self, id: RequestId) {
        let mut state = self.inner.lock();
        for requests in state.requests.values_mut() {
            requests.retain(|r| r.id != id.0);
        }
        state.requests.retain(|_, requests| !requests.is_empty());
    }

    /// Number of pending requests for an actor.
    pub fn pending(&self, actor: &str) -> usize {
        self.inner
            .lock()
            .requests
            .get(actor)
            .map_or(0, Vec::len)
    }

    /// Check an incoming line against the actor's pending requests.
    ///
    /// Delivering a response removes exactly one request; listing
    /// disambiguation candidates removes none.
    pub fn on_message(&self, actor: &str, message: &str) -> ResponseStatus {
        let tokens: Vec<&str> = message.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() > 2 {
            return ResponseStatus::NotHandled;
        }

        let Some(kind_token) = tokens[0].strip_prefix(RESPONSE_MARKER) else {
            return ResponseStatus::NotHandled;
        };
        if kind_token.is_empty() {
            return ResponseStatus::NotHandled;
        }

        let Some(kind) = ResponseType::from_command_name(kind_token) else {
            return ResponseStatus::NotHandled;
        };
        let context = tokens.get(1).copied();

        let mut state = self.inner.lock();

        let decision = {
            let Some(pending) = state.requests.get(actor) else {
                // A recognised response with nothing pending is consumed,
                // not passed on to command handling.
                return ResponseStatus::Handled {
                    messages: Vec::new(),
                };
            };

            let matching: Vec<usize> = pending
                .iter()
                .enumerate()
                .filter(|(_, r)| r.accepted.contains(&kind))
                .map(|(i, _)| i)
                .collect();

            if matching.is_empty() {
                return ResponseStatus::NotHandled;
            }

            if matching.len() == 1 {
                Decision::Deliver(matching[0])
            } else {
                match context {
                    Some(ctx) => match matching
                        .iter()
                        .copied()
                        .find(|&i| pending[i].context.eq_ignore_ascii_case(ctx))
                    {
                        Some(i) => Decision::Deliver(i),
                        None => Decision::Listing(listing_messages(kind, pending, &matching)),
                    },
                    None => Decision::Listing(listing_messages(kind, pending, &matching)),
                }
            }
        };

        match decision {
            Decision::Deliver(index) => {
                let removed = state.requests.get_mut(actor).map(|requests| {
                    let request = requests.remove(index);
                    (request, requests.is_empty())
                });
                let delivered = removed.map(|(request, now_empty)| {
                    if now_empty {
                        state.requests.remove(actor);
                    }
                    request
                });
                drop(state);

                if let Some(mut request) = delivered {
                    debug!("delivering response {kind:?} to request {}", request.id);
                    if let Some(handler) = request.handler.take() {
                        handler(kind);
                    }
                }
                ResponseStatus::Handled {
                    messages: Vec::new(),
                }
            }
            Decision::Listing(messages) => ResponseStatus::Handled { messages },
        }
    }
}

fn listing_messages(
    kind: ResponseType,
    pending: &[ResponseRequest],
    matching: &[usize],
) -> Vec<String> {
    let mut messages =
        vec!["Multiple requests for response found. Please be more specific:".to_string()];
    for &i in matching {
        messages.push(format!("/{} {}", kind.command_name(), pending[i].context));
    }
    messages
}
