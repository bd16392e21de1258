// Background model loading
//
// Requests are served by a worker thread; finished loads come back over a
// channel and are handed out by `poll`, which never blocks the frame.
// Loads are shared per path: concurrent requests for the same model wait on
// one worker job, and later requests are served from the cache.

use super::handle::{AssetId, ModelHandle};
use super::model::LoadedModel;
use super::AssetError;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Something that can produce a model for a path
///
/// Implementations run on the loader's worker thread.
pub trait ModelSource: Send + 'static {
    fn load(&self, path: &str) -> Result<LoadedModel, AssetError>;
}

/// Serves models that were built in memory
#[derive(Debug, Default)]
pub struct MemoryModelSource {
    models: HashMap<String, LoadedModel>,
    latency: Duration,
}

impl MemoryModelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under a path
    pub fn with_model(mut self, path: &str, model: LoadedModel) -> Self {
        self.models.insert(path.to_string(), model);
        self
    }

    /// Delay every load, emulating a slow fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl ModelSource for MemoryModelSource {
    fn load(&self, path: &str) -> Result<LoadedModel, AssetError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.models
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Identifies one `request` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// A finished load, delivered once per ticket
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub handle: ModelHandle,
    pub result: Result<Arc<LoadedModel>, AssetError>,
}

struct WorkerResponse {
    handle: ModelHandle,
    result: Result<LoadedModel, AssetError>,
}

/// Loads models on a worker thread and caches them by path
pub struct ModelLoader {
    requests: Option<Sender<ModelHandle>>,
    responses: Receiver<WorkerResponse>,
    worker: Option<JoinHandle<()>>,

    /// Successfully loaded models
    cache: HashMap<AssetId, Arc<LoadedModel>>,
    /// Tickets waiting on an in-flight load
    waiting: HashMap<AssetId, (ModelHandle, Vec<LoadTicket>)>,
    /// Completions ready to hand out on the next poll
    ready: Vec<LoadCompletion>,
    next_ticket: u64,
}

impl ModelLoader {
    /// Start the worker thread
    pub fn spawn(source: impl ModelSource) -> Result<Self, AssetError> {
        let (request_tx, request_rx) = unbounded::<ModelHandle>();
        let (response_tx, response_rx) = unbounded::<WorkerResponse>();

        let worker = thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || {
                for handle in request_rx.iter() {
                    debug!("Loading model {}", handle.path());
                    let result = source.load(handle.path());
                    if response_tx.send(WorkerResponse { handle, result }).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            worker: Some(worker),
            cache: HashMap::new(),
            waiting: HashMap::new(),
            ready: Vec::new(),
            next_ticket: 0,
        })
    }

    /// Ask for a model. The result arrives through a later `poll`.
    pub fn request(&mut self, handle: &ModelHandle) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;

        if let Some(model) = self.cache.get(&handle.id()) {
            self.ready.push(LoadCompletion {
                ticket,
                handle: handle.clone(),
                result: Ok(Arc::clone(model)),
            });
            return ticket;
        }

        if let Some((_, tickets)) = self.waiting.get_mut(&handle.id()) {
            tickets.push(ticket);
            return ticket;
        }

        let sent = self
            .requests
            .as_ref()
            .map_or(false, |tx| tx.send(handle.clone()).is_ok());
        if sent {
            self.waiting
                .insert(handle.id(), (handle.clone(), vec![ticket]));
        } else {
            warn!("Model worker gone, cannot load {}", handle.path());
            self.ready.push(LoadCompletion {
                ticket,
                handle: handle.clone(),
                result: Err(AssetError::WorkerGone),
            });
        }
        ticket
    }

    /// Collect every finished load without blocking
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        while let Ok(response) = self.responses.try_recv() {
            self.resolve(response);
        }
        std::mem::take(&mut self.ready)
    }

    /// Like `poll`, but waits up to `timeout` for a load to finish when
    /// nothing is ready yet
    pub fn poll_timeout(&mut self, timeout: Duration) -> Vec<LoadCompletion> {
        if self.ready.is_empty() && !self.waiting.is_empty() {
            match self.responses.recv_timeout(timeout) {
                Ok(response) => self.resolve(response),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.fail_waiting(),
            }
        }
        self.poll()
    }

    /// Number of tickets still waiting on the worker
    pub fn pending(&self) -> usize {
        self.waiting.values().map(|(_, tickets)| tickets.len()).sum()
    }

    /// Whether a model is already cached
    pub fn is_cached(&self, handle: &ModelHandle) -> bool {
        self.cache.contains_key(&handle.id())
    }

    fn resolve(&mut self, response: WorkerResponse) {
        let id = response.handle.id();
        let tickets = self
            .waiting
            .remove(&id)
            .map(|(_, tickets)| tickets)
            .unwrap_or_default();

        let result = response.result.map(Arc::new);
        if let Ok(model) = &result {
            self.cache.insert(id, Arc::clone(model));
        }

        for ticket in tickets {
            self.ready.push(LoadCompletion {
                ticket,
                handle: response.handle.clone(),
                result: result.clone(),
            });
        }
    }

    fn fail_waiting(&mut self) {
        for (_, (handle, tickets)) in self.waiting.drain() {
            warn!("Model worker stopped before {} finished", handle.path());
            for ticket in tickets {
                self.ready.push(LoadCompletion {
                    ticket,
                    handle: handle.clone(),
                    result: Err(AssetError::WorkerGone),
                });
            }
        }
    }
}

impl Drop for ModelLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
