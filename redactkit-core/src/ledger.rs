//! ledger.rs - Concurrency-safe audit trail of redactions.
//!
//! Redactors hand every [`Redaction`] to a [`RedactionLedger`] and move on
//! without waiting: the record travels over an unbounded channel to a single
//! consumer thread, which applies it to the shared [`RedactionList`] under a
//! mutex. Readers call [`RedactionLedger::snapshot`], which first pushes a
//! barrier through the same channel. Because the channel is FIFO, the
//! barrier is acknowledged only after every record sent before it has been
//! applied.
//!
//! [`RedactionLedger::reset`] travels the same path, so records sent before a
//! reset are applied and then cleared together.
//!
//! The blocking methods must not be called from inside an async runtime; use
//! the `_async` variants there.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tokio::sync::{mpsc, oneshot};

use crate::redaction::{Redaction, RedactionList, RedactionWarning};

static DEFAULT_LEDGER: Lazy<RedactionLedger> = Lazy::new(RedactionLedger::new);

/// The process-wide ledger used by the free functions in [`crate::engine`].
pub fn default_ledger() -> &'static RedactionLedger {
    &DEFAULT_LEDGER
}

#[derive(Debug)]
enum LedgerCommand {
    Append(Redaction),
    Warn(RedactionWarning),
    Flush(oneshot::Sender<()>),
    Reset(oneshot::Sender<()>),
}

/// Cloneable handle to a shared redaction list.
///
/// Clones refer to the same list and the same consumer thread. The thread
/// exits once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct RedactionLedger {
    tx: mpsc::UnboundedSender<LedgerCommand>,
    list: Arc<Mutex<RedactionList>>,
}

impl Default for RedactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RedactionLedger {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let list = Arc::new(Mutex::new(RedactionList::new()));
        let worker_list = Arc::clone(&list);

        let spawned = thread::Builder::new()
            .name("redaction-ledger".to_string())
            .spawn(move || consume(rx, worker_list));
        if let Err(e) = spawned {
            // The receiver was dropped with the closure, so every send now
            // fails and is applied inline instead.
            warn!("Could not start the redaction ledger worker, recording inline: {}", e);
        }

        Self { tx, list }
    }

    /// Queues a redaction record and returns immediately.
    pub fn record(&self, redaction: Redaction) {
        self.send(LedgerCommand::Append(redaction));
    }

    /// Queues a warning for a redactor that had to be skipped.
    pub fn warn(&self, warning: RedactionWarning) {
        self.send(LedgerCommand::Warn(warning));
    }

    /// Blocks until every record queued before this call has been applied.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime. Use
    /// [`flush_async`](Self::flush_async) there.
    pub fn flush(&self) {
        let _ = self.barrier(LedgerCommand::Flush).blocking_recv();
    }

    pub async fn flush_async(&self) {
        let _ = self.barrier(LedgerCommand::Flush).await;
    }

    /// Copies both indices after waiting for all previously queued records.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime. Use
    /// [`snapshot_async`](Self::snapshot_async) there.
    pub fn snapshot(&self) -> RedactionList {
        self.flush();
        lock(&self.list).clone()
    }

    pub async fn snapshot_async(&self) -> RedactionList {
        self.flush_async().await;
        lock(&self.list).clone()
    }

    /// Applies every record queued before this call, then clears both
    /// indices and the warnings in one step.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime. Use
    /// [`reset_async`](Self::reset_async) there.
    pub fn reset(&self) {
        let _ = self.barrier(LedgerCommand::Reset).blocking_recv();
    }

    pub async fn reset_async(&self) {
        let _ = self.barrier(LedgerCommand::Reset).await;
    }

    fn barrier(&self, command: fn(oneshot::Sender<()>) -> LedgerCommand) -> oneshot::Receiver<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(command(ack_tx));
        ack_rx
    }

    fn send(&self, command: LedgerCommand) {
        if let Err(mpsc::error::SendError(command)) = self.tx.send(command) {
            apply(&self.list, command);
        }
    }

    #[cfg(test)]
    fn detached() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self {
            tx,
            list: Arc::new(Mutex::new(RedactionList::new())),
        }
    }
}

fn consume(mut rx: mpsc::UnboundedReceiver<LedgerCommand>, list: Arc<Mutex<RedactionList>>) {
    debug!("Redaction ledger worker started.");
    while let Some(command) = rx.blocking_recv() {
        apply(&list, command);
    }
    debug!("Redaction ledger worker stopped.");
}

fn apply(list: &Mutex<RedactionList>, command: LedgerCommand) {
    match command {
        LedgerCommand::Append(redaction) => lock(list).push(redaction),
        LedgerCommand::Warn(warning) => lock(list).push_warning(warning),
        LedgerCommand::Flush(ack) => {
            let _ = ack.send(());
        }
        LedgerCommand::Reset(ack) => {
            *lock(list) = RedactionList::new();
            let _ = ack.send(());
        }
    }
}

fn lock(list: &Mutex<RedactionList>) -> MutexGuard<'_, RedactionList> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}
