//! Live Feeds
//!
//! A subscription is the receiving end of a bounded channel fed by a
//! background task. Closing or dropping it closes the channel, which the
//! producing task observes and uses as its signal to stop.

use tokio::sync::mpsc;

use crate::domain::DomainResult;
use super::traits::DocumentSnapshot;

/// Snapshots buffered before a slow consumer applies backpressure
pub const FEED_BUFFER: usize = 16;

type Decode<T> = Box<dyn Fn(Vec<DocumentSnapshot>) -> T + Send + Sync>;

/// Consumer side of a live collection feed
pub struct Subscription<T = Vec<DocumentSnapshot>> {
    rx: mpsc::Receiver<DomainResult<Vec<DocumentSnapshot>>>,
    decode: Decode<T>,
}

/// Producer side of a live collection feed
#[derive(Clone)]
pub struct FeedSender {
    tx: mpsc::Sender<DomainResult<Vec<DocumentSnapshot>>>,
}

/// Create a connected feed pair
pub fn feed() -> (FeedSender, Subscription) {
    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    (
        FeedSender { tx },
        Subscription {
            rx,
            decode: Box::new(|docs| docs),
        },
    )
}

impl FeedSender {
    /// Deliver one event; returns false once the subscriber is gone
    pub async fn send(&self, event: DomainResult<Vec<DocumentSnapshot>>) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Resolves when the subscriber has unsubscribed
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T: 'static> Subscription<T> {
    /// Next snapshot or feed error; `None` once the feed has ended
    pub async fn next(&mut self) -> Option<DomainResult<T>> {
        let event = self.rx.recv().await?;
        Some(event.map(|docs| (self.decode)(docs)))
    }

    /// Transform every snapshot delivered by this feed
    pub fn map<U>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Subscription<U> {
        let decode = self.decode;
        Subscription {
            rx: self.rx,
            decode: Box::new(move |docs| f(decode(docs))),
        }
    }

    /// Stop the feed
    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[tokio::test]
    async fn test_map_and_error_pass_through() {
        let (tx, sub) = feed();
        let mut counts = sub.map(|docs| docs.len());

        assert!(tx.send(Ok(Vec::new())).await);
        assert!(tx.send(Err(DomainError::remote("offline"))).await);

        assert_eq!(counts.next().await, Some(Ok(0)));
        assert_eq!(counts.next().await, Some(Err(DomainError::remote("offline"))));
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_producer() {
        let (tx, sub) = feed();
        sub.unsubscribe();

        tx.closed().await;
        assert!(tx.is_closed());
        assert!(!tx.send(Ok(Vec::new())).await);
    }

    #[tokio::test]
    async fn test_feed_ends_when_producer_drops() {
        let (tx, mut sub) = feed();
        drop(tx);
        assert!(sub.next().await.is_none());
    }
}
