//! Background thread that performs catalog network calls
//!
//! The worker never touches the cache or the tracked objects. It hands raw
//! results back over a channel; the control thread applies them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use super::catalog::GroupSource;
use super::source::CatalogSource;
use crate::error::FetchError;

#[derive(Debug)]
enum FetchCommand {
    Fetch(FetchRequest),
    Stop,
}

#[derive(Debug)]
struct FetchRequest {
    generation: u64,
    group_id: String,
    source: GroupSource,
}

/// Outcome of one request, tagged with the generation it was issued under
#[derive(Debug)]
pub struct FetchResponse {
    pub generation: u64,
    pub group_id: String,
    pub result: Result<String, FetchError>,
}

/// Dropping the worker does not wait for it. Queued requests are skipped and
/// a call already in flight finishes on the detached thread.
pub struct FetchWorker {
    sender: Sender<FetchCommand>,
    receiver: Receiver<FetchResponse>,
    stop: Arc<AtomicBool>,
    _handle: thread::JoinHandle<()>,
}

impl FetchWorker {
    pub fn spawn(source: Arc<dyn CatalogSource>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FetchCommand>();
        let (result_tx, result_rx) = mpsc::channel::<FetchResponse>();
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();

        let handle = thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                if worker_stop.load(Ordering::Relaxed) {
                    break;
                }
                match command {
                    FetchCommand::Fetch(request) => {
                        log::debug!(
                            "Worker fetching group '{}' (generation {})",
                            request.group_id,
                            request.generation
                        );
                        let result = source.fetch(&request.source);
                        let response = FetchResponse {
                            generation: request.generation,
                            group_id: request.group_id,
                            result,
                        };
                        if result_tx.send(response).is_err() {
                            break;
                        }
                    }
                    FetchCommand::Stop => break,
                }
            }
        });

        Self {
            sender: cmd_tx,
            receiver: result_rx,
            stop,
            _handle: handle,
        }
    }

    pub fn request(
        &self,
        generation: u64,
        group_id: &str,
        source: &GroupSource,
    ) -> Result<(), FetchError> {
        self.sender
            .send(FetchCommand::Fetch(FetchRequest {
                generation,
                group_id: group_id.to_string(),
                source: source.clone(),
            }))
            .map_err(|_| FetchError::WorkerGone)
    }

    /// Non-blocking: next finished response, if any
    pub fn try_next(&self) -> Result<Option<FetchResponse>, FetchError> {
        match self.receiver.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(FetchError::WorkerGone),
        }
    }

    /// Blocking: wait for the next response
    pub fn next_blocking(&self, timeout: std::time::Duration) -> Option<FetchResponse> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.sender.send(FetchCommand::Stop);
        log::debug!("Fetch worker stopped");
    }
}
