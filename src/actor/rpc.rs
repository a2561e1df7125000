//! In-process RPC between the resizer's front ends and its background.
//!
//! The router answers `ping` and keeps a counter in the preference store.
//! Clients are constructed explicitly from the actor's sender; there is no
//! process-wide client.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::actor;
use crate::model::prefs::{COUNTER_KEY, PersistError, PreferenceStore};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    CounterGet,
    CounterIncrement,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type", content = "value")]
pub enum Response {
    Pong(String),
    /// Integers stay integers; a stored fractional count is kept as is.
    Counter(Number),
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("rejected request from {0:?}")]
    Rejected(String),
    #[error("rpc actor is not running")]
    Disconnected,
    #[error("unexpected response {0:?}")]
    Unexpected(Response),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub struct Envelope {
    pub sender: String,
    pub request: Request,
    pub reply: oneshot::Sender<Result<Response, RpcError>>,
}

pub type Sender = actor::Sender<Envelope>;
pub type Receiver = actor::Receiver<Envelope>;

pub struct Router<P> {
    prefs: P,
}

impl<P: PreferenceStore> Router<P> {
    pub fn new(prefs: P) -> Self { Self { prefs } }

    pub fn handle(&self, request: Request) -> Result<Response, RpcError> {
        match request {
            Request::Ping => Ok(Response::Pong("pong".to_string())),
            Request::CounterGet => Ok(Response::Counter(self.counter()?)),
            Request::CounterIncrement => {
                let next = increment(&self.counter()?);
                self.prefs.set(COUNTER_KEY, next.clone().into())?;
                Ok(Response::Counter(next))
            }
        }
    }

    /// Any stored JSON number counts; anything else reads as zero.
    fn counter(&self) -> Result<Number, RpcError> {
        Ok(match self.prefs.get(COUNTER_KEY)? {
            Some(serde_json::Value::Number(n)) => n,
            _ => Number::from(0),
        })
    }
}

fn increment(n: &Number) -> Number {
    n.as_i64()
        .and_then(|i| i.checked_add(1))
        .map(Number::from)
        .or_else(|| n.as_f64().and_then(|f| Number::from_f64(f + 1.0)))
        .unwrap_or_else(|| Number::from(1))
}

/// Serves [`Router`] requests, accepting only those from `owner`.
pub struct RpcActor<P> {
    owner: String,
    router: Router<P>,
    rx: Receiver,
}

impl<P: PreferenceStore> RpcActor<P> {
    pub fn new(owner: impl Into<String>, prefs: P, rx: Receiver) -> Self {
        Self { owner: owner.into(), router: Router::new(prefs), rx }
    }

    pub async fn run(mut self) {
        debug!(owner = %self.owner, "rpc background ready");
        while let Some((span, envelope)) = self.rx.recv().await {
            let _guard = span.enter();
            self.handle_envelope(envelope);
        }
    }

    #[instrument(skip_all, fields(request = ?envelope.request))]
    fn handle_envelope(&self, envelope: Envelope) {
        let Envelope { sender, request, reply } = envelope;
        let result = if sender != self.owner {
            warn!(%sender, "rejected rpc request");
            Err(RpcError::Rejected(sender))
        } else {
            self.router.handle(request)
        };
        if reply.send(result).is_err() {
            debug!("rpc caller went away before the reply");
        }
    }
}

#[derive(Clone)]
pub struct RpcClient {
    id: String,
    tx: Sender,
}

impl RpcClient {
    pub fn new(id: impl Into<String>, tx: Sender) -> Self { Self { id: id.into(), tx } }

    pub async fn call(&self, request: Request) -> Result<Response, RpcError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { sender: self.id.clone(), request, reply })
            .map_err(|_| RpcError::Disconnected)?;
        rx.await.map_err(|_| RpcError::Disconnected)?
    }

    pub async fn ping(&self) -> Result<String, RpcError> {
        match self.call(Request::Ping).await? {
            Response::Pong(s) => Ok(s),
            other => Err(RpcError::Unexpected(other)),
        }
    }

    pub async fn counter_get(&self) -> Result<Number, RpcError> {
        self.counter(Request::CounterGet).await
    }

    pub async fn counter_increment(&self) -> Result<Number, RpcError> {
        self.counter(Request::CounterIncrement).await
    }

    async fn counter(&self, request: Request) -> Result<Number, RpcError> {
        match self.call(request).await? {
            Response::Counter(n) => Ok(n),
            other => Err(RpcError::Unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::prefs::MemoryStore;

    fn spawn(prefs: Arc<MemoryStore>) -> Sender {
        let (tx, rx) = actor::channel();
        tokio::spawn(RpcActor::new("resizer", prefs, rx).run());
        tx
    }

    #[tokio::test]
    async fn counter_round_trip() {
        let prefs = Arc::new(MemoryStore::new());
        let client = RpcClient::new("resizer", spawn(prefs.clone()));
        assert_eq!(client.ping().await.unwrap(), "pong");
        assert_eq!(client.counter_get().await.unwrap(), Number::from(0));
        assert_eq!(client.counter_increment().await.unwrap(), Number::from(1));
        assert_eq!(client.counter_increment().await.unwrap(), Number::from(2));
        assert_eq!(client.counter_get().await.unwrap(), Number::from(2));
        assert_eq!(prefs.get_i64(COUNTER_KEY), Some(2));
    }

    #[tokio::test]
    async fn non_numeric_counter_reads_as_zero() {
        let prefs = Arc::new(MemoryStore::new());
        prefs.set(COUNTER_KEY, json!("seven")).unwrap();
        let client = RpcClient::new("resizer", spawn(prefs));
        assert_eq!(client.counter_increment().await.unwrap(), Number::from(1));
    }

    #[tokio::test]
    async fn fractional_counter_keeps_counting() {
        let prefs = Arc::new(MemoryStore::new());
        prefs.set(COUNTER_KEY, json!(1.5)).unwrap();
        let client = RpcClient::new("resizer", spawn(prefs.clone()));
        assert_eq!(client.counter_get().await.unwrap().as_f64(), Some(1.5));
        assert_eq!(client.counter_increment().await.unwrap().as_f64(), Some(2.5));
        assert_eq!(prefs.get(COUNTER_KEY).unwrap(), Some(json!(2.5)));
    }

    #[tokio::test]
    async fn foreign_senders_are_rejected() {
        let client = RpcClient::new("someone-else", spawn(Arc::new(MemoryStore::new())));
        assert!(matches!(client.ping().await, Err(RpcError::Rejected(s)) if s == "someone-else"));
    }

    #[tokio::test]
    async fn stopped_actor_is_disconnected() {
        let (tx, rx) = actor::channel();
        drop(rx);
        let client = RpcClient::new("resizer", tx);
        assert!(matches!(client.ping().await, Err(RpcError::Disconnected)));
    }

    #[test]
    fn requests_use_type_tag() {
        assert_eq!(serde_json::to_value(Request::CounterIncrement).unwrap(), json!({
            "type": "counter_increment"
        }));
        assert_eq!(serde_json::to_value(Response::Counter(3.into())).unwrap(), json!({
            "type": "counter",
            "value": 3
        }));
    }
}
