use dracin_model::{ScanLogFrame, ScanRealtime, ScanStatusFrame};
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the `/scan/stream` subscription produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The connection was accepted.
    Opened,
    /// A `log` event.
    Log(ScanLogFrame),
    /// A `status` event.
    Status(ScanRealtime),
    /// Transport failure. The subscription is over; nothing reconnects.
    Error(String),
    /// The server ended the stream.
    Closed,
}

/// Decode one server-sent event. Keepalives, unknown event names and
/// malformed payloads yield `None`.
pub fn decode_event(event: &str, data: &str) -> Option<StreamEvent> {
    let data = data.trim();
    if data.is_empty() || data == "keepalive" {
        debug!("scan stream keepalive");
        return None;
    }

    match event {
        "log" => match serde_json::from_str::<ScanLogFrame>(data) {
            Ok(frame) => Some(StreamEvent::Log(frame)),
            Err(err) => {
                debug!(error = %err, "skipping malformed log event");
                None
            }
        },
        "status" => match serde_json::from_str::<ScanStatusFrame>(data) {
            Ok(frame) => Some(StreamEvent::Status(frame.into_realtime())),
            Err(err) => {
                debug!(error = %err, "skipping malformed status event");
                None
            }
        },
        other => {
            debug!(event = other, "ignoring scan stream event");
            None
        }
    }
}

fn decode_message(message: &eventsource_stream::Event) -> Option<StreamEvent> {
    decode_event(&message.event, &message.data)
}

/// Handle to a running event-stream subscription.
///
/// The connection lives in a spawned task that forwards decoded events over
/// a channel. Closing or dropping the handle aborts the task, which drops the
/// connection.
#[derive(Debug)]
pub struct ScanStream {
    events: mpsc::UnboundedReceiver<StreamEvent>,
    task: Option<JoinHandle<()>>,
}

impl ScanStream {
    pub(crate) fn spawn(mut source: EventSource) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(event) = source.next().await {
                let forwarded = match event {
                    Ok(Event::Open) => {
                        info!("scan stream opened");
                        Some(StreamEvent::Opened)
                    }
                    Ok(Event::Message(message)) => decode_message(&message),
                    Err(err) => {
                        warn!(error = %err, "scan stream failed");
                        let _ = tx.send(StreamEvent::Error(err.to_string()));
                        break;
                    }
                };
                if let Some(event) = forwarded
                    && tx.send(event).is_err()
                {
                    break;
                }
            }
            source.close();
            let _ = tx.send(StreamEvent::Closed);
        });

        Self {
            events: rx,
            task: Some(task),
        }
    }

    /// Stream fed by an arbitrary producer, e.g. a test double.
    pub fn from_receiver(events: mpsc::UnboundedReceiver<StreamEvent>) -> Self {
        Self { events, task: None }
    }

    /// Next event; `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Stop the reader task. Idempotent.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
    }
}

impl Drop for ScanStream {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
