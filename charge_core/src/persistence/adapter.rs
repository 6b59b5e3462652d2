//! Persistence adapter - JSON encoding and a single background writer.
//!
//! Writes are queued onto an MPSC channel and applied in order by one
//! consumer task, so the tick loop never blocks on storage. `flush` sends a
//! sentinel and waits for everything queued before it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError};

enum WriteRequest {
    Save { key: String, value: String },
    Flush(oneshot::Sender<()>),
}

/// Reads and writes family state under one storage group.
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    group: String,
    tx: mpsc::UnboundedSender<WriteRequest>,
    worker_handle: tokio::task::JoinHandle<()>,
}

impl PersistenceAdapter {
    /// Create an adapter and spawn its writer on the current tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, group: impl Into<String>) -> Result<Self, StoreError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| StoreError::Io(format!("no async runtime for the writer: {e}")))?;
        let group = group.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let worker_handle = handle.spawn(write_worker(rx, store.clone(), group.clone()));

        Ok(Self {
            store,
            group,
            tx,
            worker_handle,
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Queue a value for writing. Returns once it is encoded, not written.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_string(value)?;
        self.save_raw(key, value)
    }

    /// Queue an already encoded value.
    pub fn save_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.tx
            .send(WriteRequest::Save {
                key: key.to_owned(),
                value,
            })
            .map_err(|_| StoreError::WriterClosed)
    }

    /// Read and decode a value synchronously.
    ///
    /// A missing key is `Ok(None)`; an undecodable one is a
    /// `StoreError::Serialization`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(&self.group, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Wait until every write queued so far has reached the store.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(WriteRequest::Flush(reply_tx)).map_err(|_| {
            if self.worker_handle.is_finished() {
                warn!(group = %self.group, "writer exited before flush");
            }
            StoreError::WriterClosed
        })?;
        reply_rx.await.map_err(|_| StoreError::WriterClosed)
    }
}

async fn write_worker(
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    store: Arc<dyn KeyValueStore>,
    group: String,
) {
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Flush(reply) => {
                let _ = reply.send(());
            }
            WriteRequest::Save { key, value } => {
                let store = store.clone();
                let grp = group.clone();
                let write_key = key.clone();
                let result =
                    tokio::task::spawn_blocking(move || store.set(&grp, &write_key, &value)).await;
                match result {
                    Ok(Ok(())) => debug!(%group, %key, "state written"),
                    Ok(Err(e)) => warn!(%group, %key, error = %e, "state write failed"),
                    Err(e) => warn!(%group, %key, error = %e, "state write task failed"),
                }
            }
        }
    }
}
