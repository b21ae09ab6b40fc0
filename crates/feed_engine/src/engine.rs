use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_info;
use feed_core::Operation;

use crate::{EngineConfig, EngineError, FeedEngine, FeedEvent};

enum EngineCommand {
    Run(Operation),
}

/// Runs a `FeedEngine` on its own thread.
///
/// Commands are queued and executed one at a time, in submission order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<FeedEvent>,
    pending: Arc<AtomicUsize>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = FeedEngine::from_config(&config)?;
        Self::spawn(engine)
    }

    pub fn spawn(engine: FeedEngine) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let runtime = tokio::runtime::Runtime::new()?;

        let worker_pending = Arc::clone(&pending);
        thread::spawn(move || {
            let mut engine = engine;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Run(op) => {
                        let _ = event_tx.send(FeedEvent::Started(op));
                        let stories = runtime.block_on(engine.run(op));
                        worker_pending.fetch_sub(1, Ordering::SeqCst);
                        let _ = event_tx.send(FeedEvent::Completed {
                            op,
                            stories,
                            status: engine.status().clone(),
                            loaded_count: engine.loaded_count(),
                            ranking_len: engine.ranking_len(),
                        });
                    }
                }
            }
            engine_info!("feed engine worker stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            pending,
        })
    }

    pub fn enqueue(&self, op: Operation) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.cmd_tx.send(EngineCommand::Run(op)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// True while a command is queued or running.
    pub fn is_busy(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn try_recv(&self) -> Option<FeedEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the worker has stopped.
    pub fn recv(&self) -> Option<FeedEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
