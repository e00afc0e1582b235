//! Mock event transport for testing
//!
//! Records every open and close in one ordered log and hands the test the
//! signal sender of each connection, so transport behavior can be scripted.

use are_rest_core::{Error, EventConnection, EventTransport, Result, TransportSignal};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct MockEventTransport {
    streaming_unsupported: bool,
    fail_open: bool,
    close_on_open: bool,
    log: Arc<Mutex<Vec<String>>>,
    connections: Mutex<Vec<mpsc::UnboundedSender<TransportSignal>>>,
}

impl MockEventTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that reports no streaming support
    pub fn without_streaming() -> Self {
        Self {
            streaming_unsupported: true,
            ..Default::default()
        }
    }

    /// Transport whose `open` always fails
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }

    /// Transport that reports `Closed` as soon as a connection opens
    pub fn closing_immediately() -> Self {
        Self {
            close_on_open: true,
            ..Default::default()
        }
    }

    /// Ordered `open <url>` / `close <url>` entries
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Deliver `signal` on the `index`-th opened connection
    pub fn signal(&self, index: usize, signal: TransportSignal) {
        let sender = self.connections.lock()[index].clone();
        // The session may already be gone, which is what some tests check
        let _ = sender.send(signal);
    }

    /// Deliver an `event`-named message on the `index`-th connection
    pub fn event(&self, index: usize, data: &str) {
        self.signal(
            index,
            TransportSignal::Message {
                event: "event".to_string(),
                data: data.to_string(),
                id: String::new(),
            },
        );
    }
}

impl EventTransport for MockEventTransport {
    fn supports_streaming(&self) -> bool {
        !self.streaming_unsupported
    }

    fn open(
        &self,
        url: &str,
        signals: mpsc::UnboundedSender<TransportSignal>,
    ) -> Result<Box<dyn EventConnection>> {
        if self.fail_open {
            return Err(Error::Transport(format!("cannot reach {}", url)));
        }

        self.log.lock().push(format!("open {}", url));
        if self.close_on_open {
            let _ = signals.send(TransportSignal::Closed);
        }
        self.connections.lock().push(signals);

        Ok(Box::new(MockConnection {
            url: url.to_string(),
            log: Arc::clone(&self.log),
            closed: false,
        }))
    }
}

struct MockConnection {
    url: String,
    log: Arc<Mutex<Vec<String>>>,
    closed: bool,
}

impl EventConnection for MockConnection {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().push(format!("close {}", self.url));
        }
    }
}
