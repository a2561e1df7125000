//! Actors communicate over unbounded channels. Each event carries the span it
//! was sent from so handling can be traced back to the caller.

use tokio::sync::mpsc;
use tracing::Span;

pub mod onboarding;
pub mod rpc;

pub struct Sender<E>(mpsc::UnboundedSender<(Span, E)>);

pub type Receiver<E> = mpsc::UnboundedReceiver<(Span, E)>;

#[derive(Debug, thiserror::Error)]
#[error("actor has shut down")]
pub struct SendError<E>(pub E);

impl<E> Sender<E> {
    pub fn send(&self, event: E) -> Result<(), SendError<E>> {
        self.0.send((Span::current(), event)).map_err(|err| SendError(err.0.1))
    }

    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}
