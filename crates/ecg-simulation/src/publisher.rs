//! Publish/subscribe registry for emitted records
//!
//! Sinks receive every record published after they subscribe and a single
//! completion call when the publisher completes. Channel-backed streams are
//! unbounded: a slow reader never blocks the publisher, and unread records
//! accumulate until the reader catches up or drops the stream.

use ecg_core::EcgRecord;
use tokio::sync::mpsc;

/// Identifier returned by [`RecordPublisher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiver side of a subscription
pub trait RecordSink: Send {
    /// Called for every published record
    fn on_record(&mut self, record: &EcgRecord);

    /// Called once when the publisher completes
    fn on_complete(&mut self);

    /// Closed sinks are dropped from the registry on the next publish
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sink built from closures
pub struct FnSink {
    on_record: Box<dyn FnMut(&EcgRecord) + Send>,
    on_complete: Option<Box<dyn FnOnce() + Send>>,
}

impl FnSink {
    pub fn new(on_record: impl FnMut(&EcgRecord) + Send + 'static) -> Self {
        FnSink {
            on_record: Box::new(on_record),
            on_complete: None,
        }
    }

    /// Attach a completion callback
    pub fn with_complete(mut self, on_complete: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl RecordSink for FnSink {
    fn on_record(&mut self, record: &EcgRecord) {
        (self.on_record)(record);
    }

    fn on_complete(&mut self) {
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }
}

/// Sink feeding an unbounded channel; completion closes the channel
struct ChannelSink {
    sender: Option<mpsc::UnboundedSender<EcgRecord>>,
}

impl RecordSink for ChannelSink {
    fn on_record(&mut self, record: &EcgRecord) {
        if let Some(sender) = &self.sender {
            // A dropped receiver is pruned on the next publish
            let _ = sender.send(*record);
        }
    }

    fn on_complete(&mut self) {
        self.sender = None;
    }

    fn is_closed(&self) -> bool {
        self.sender.as_ref().map_or(true, |s| s.is_closed())
    }
}

/// Pull side of a channel subscription
///
/// `recv` yields buffered records in publish order and returns `None` once
/// the publisher has completed and the buffer is drained.
#[derive(Debug)]
pub struct RecordStream {
    receiver: mpsc::UnboundedReceiver<EcgRecord>,
}

impl RecordStream {
    /// Wait for the next record; `None` means the feed has completed
    pub async fn recv(&mut self) -> Option<EcgRecord> {
        self.receiver.recv().await
    }

    /// Take a buffered record without waiting
    pub fn try_recv(&mut self) -> Result<EcgRecord, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocking receive for consumers outside the async runtime
    pub fn blocking_recv(&mut self) -> Option<EcgRecord> {
        self.receiver.blocking_recv()
    }

    /// Take everything currently buffered
    pub fn drain(&mut self) -> Vec<EcgRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.receiver.try_recv() {
            records.push(record);
        }
        records
    }
}

/// Registry of record sinks
#[derive(Default)]
pub struct RecordPublisher {
    sinks: Vec<(SubscriberId, Box<dyn RecordSink>)>,
    next_id: u64,
    completed: bool,
}

impl RecordPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink. After completion the sink is completed immediately
    /// and not retained.
    pub fn subscribe(&mut self, mut sink: impl RecordSink + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;

        if self.completed {
            sink.on_complete();
        } else {
            self.sinks.push((id, Box::new(sink)));
        }
        id
    }

    /// Register an unbounded channel and return its receiving end
    pub fn subscribe_stream(&mut self) -> RecordStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribe(ChannelSink {
            sender: Some(sender),
        });
        RecordStream { receiver }
    }

    /// Remove a sink without completing it; returns whether it was present
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        self.sinks.len() != before
    }

    /// Deliver a record to every sink; returns how many sinks received it
    pub fn publish(&mut self, record: &EcgRecord) -> usize {
        if self.completed {
            return 0;
        }

        self.sinks.retain(|(_, sink)| !sink.is_closed());
        for (_, sink) in self.sinks.iter_mut() {
            sink.on_record(record);
        }
        self.sinks.len()
    }

    /// Complete every sink once and clear the registry
    pub fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;

        for (_, mut sink) in self.sinks.drain(..) {
            sink.on_complete();
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of registered sinks
    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::TraceLabel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(heart_rate: f64) -> EcgRecord {
        EcgRecord {
            time: 0.0,
            heart_rate,
            blood_pressure: 120.0,
            blood_volume: 70.0,
            oxygenation: 98.0,
            trace: TraceLabel::A,
        }
    }

    fn counting_sink() -> (FnSink, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let records = Arc::new(AtomicUsize::new(0));
        let completions = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&records);
        let c = Arc::clone(&completions);
        let sink = FnSink::new(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .with_complete(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (sink, records, completions)
    }

    #[test]
    fn test_publish_reaches_every_sink() {
        let mut publisher = RecordPublisher::new();
        let (sink_a, records_a, _) = counting_sink();
        let (sink_b, records_b, _) = counting_sink();
        publisher.subscribe(sink_a);
        publisher.subscribe(sink_b);

        assert_eq!(publisher.publish(&record(60.0)), 2);
        assert_eq!(publisher.publish(&record(61.0)), 2);

        assert_eq!(records_a.load(Ordering::SeqCst), 2);
        assert_eq!(records_b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut publisher = RecordPublisher::new();
        let (sink, records, completions) = counting_sink();
        let id = publisher.subscribe(sink);

        publisher.publish(&record(60.0));
        assert!(publisher.unsubscribe(id));
        assert!(!publisher.unsubscribe(id));
        publisher.publish(&record(61.0));
        publisher.complete();

        assert_eq!(records.load(Ordering::SeqCst), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_complete_exactly_once() {
        let mut publisher = RecordPublisher::new();
        let (sink, records, completions) = counting_sink();
        publisher.subscribe(sink);

        publisher.publish(&record(60.0));
        publisher.complete();
        publisher.complete();
        assert_eq!(publisher.publish(&record(61.0)), 0);

        assert!(publisher.is_completed());
        assert_eq!(publisher.subscriber_count(), 0);
        assert_eq!(records.load(Ordering::SeqCst), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_after_complete() {
        let mut publisher = RecordPublisher::new();
        publisher.complete();

        let (sink, _, completions) = counting_sink();
        publisher.subscribe(sink);

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_stream_buffers_until_read() {
        let mut publisher = RecordPublisher::new();
        let mut stream = publisher.subscribe_stream();

        for i in 0..1000 {
            publisher.publish(&record(i as f64));
        }
        publisher.complete();

        let records = stream.drain();
        assert_eq!(records.len(), 1000);
        assert_eq!(records[999].heart_rate, 999.0);
        assert!(matches!(
            stream.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_dropped_stream_is_pruned() {
        let mut publisher = RecordPublisher::new();
        let stream = publisher.subscribe_stream();
        let (sink, _, _) = counting_sink();
        publisher.subscribe(sink);
        assert_eq!(publisher.subscriber_count(), 2);

        drop(stream);
        assert_eq!(publisher.publish(&record(60.0)), 1);
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_stream_ends_after_completion() {
        let mut publisher = RecordPublisher::new();
        let mut stream = publisher.subscribe_stream();

        publisher.publish(&record(60.0));
        publisher.complete();

        assert_eq!(stream.recv().await.map(|r| r.heart_rate), Some(60.0));
        assert!(stream.recv().await.is_none());
    }
}
