use crate::cancel::CancellationSignal;
use crate::engine::{MergeEngine, RunStatus};
use crate::error::{Error, Result};
use crate::merge_log::{LogEntry, MergeLog};
use crate::progress::{MergeReporter, ProgressEvent};
use crate::request::MergeRequest;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info, warn};

/// Terminal record of a run. Exactly one is produced per started run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub elapsed_seconds: u64,
    pub log: MergeLog,
    pub canceled: bool,
    pub failed: bool,
    pub error: Option<String>,
}

impl MergeOutcome {
    pub fn elapsed_minutes_seconds(&self) -> (u64, u64) {
        (self.elapsed_seconds / 60, self.elapsed_seconds % 60)
    }
}

/// Messages sent from the merge worker to whoever owns the [`MergeHandle`].
#[derive(Debug, Clone)]
pub enum MergeEvent {
    Progress(ProgressEvent),
    Complete(MergeOutcome),
}

struct ChannelReporter {
    sender: Sender<MergeEvent>,
}

impl MergeReporter for ChannelReporter {
    fn report(&self, event: &ProgressEvent) {
        // Receiver gone means nobody is listening any more; the run carries on.
        let _ = self.sender.send(MergeEvent::Progress(event.clone()));
    }
}

struct ActiveRun {
    cancel: CancellationSignal,
    // Set by the worker once the merge itself is over, just before the outcome is sent
    finished: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl ActiveRun {
    fn is_running(&self) -> bool {
        !self.finished.load(Ordering::SeqCst) && !self.worker.is_finished()
    }
}

/// Runs merges on a background worker, one at a time.
#[derive(Default)]
pub struct MergeController {
    active: Option<ActiveRun>,
    // None: unbounded event queue
    event_capacity: Option<usize>,
}

impl MergeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the event queue of each run. The worker waits whenever `capacity`
    /// progress events are pending, so a slow consumer also slows the merge.
    /// A capacity of 0 hands over every event directly.
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            active: None,
            event_capacity: Some(capacity),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(ActiveRun::is_running)
            .unwrap_or(false)
    }

    /// Spawn the worker for `request`. Events arrive on the returned handle.
    pub fn start(&mut self, request: MergeRequest) -> Result<MergeHandle> {
        if self.is_running() {
            return Err(Error::RunInProgress);
        }
        if let Some(previous) = self.active.take() {
            if previous.worker.join().is_err() {
                warn!("Previous merge worker panicked");
            }
        }

        let cancel = CancellationSignal::new();
        let (sender, receiver) = match self.event_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };

        let finished = Arc::new(AtomicBool::new(false));

        let worker_cancel = cancel.clone();
        let worker_finished = finished.clone();
        let worker = thread::Builder::new()
            .name("merge-worker".to_string())
            .spawn(move || run_worker(request, worker_cancel, worker_finished, sender))?;

        self.active = Some(ActiveRun {
            cancel: cancel.clone(),
            finished,
            worker,
        });

        Ok(MergeHandle {
            events: receiver,
            cancel,
            done: false,
        })
    }

    /// Start a run and deliver its events on the calling thread until it ends.
    pub fn start_with_callbacks<P, C>(
        &mut self,
        request: MergeRequest,
        on_progress: P,
        on_complete: C,
    ) -> Result<()>
    where
        P: FnMut(&ProgressEvent),
        C: FnOnce(MergeOutcome),
    {
        let handle = self.start(request)?;
        handle.dispatch(on_progress, on_complete);
        Ok(())
    }

    /// Ask the active run to stop at its next checkpoint. Returns `false` when
    /// there is no active run or it was already asked.
    pub fn cancel(&self) -> bool {
        match &self.active {
            Some(run) if run.is_running() => run.cancel.cancel(),
            _ => false,
        }
    }
}

/// Caller-side end of a run.
pub struct MergeHandle {
    events: Receiver<MergeEvent>,
    cancel: CancellationSignal,
    done: bool,
}

impl MergeHandle {
    pub fn events(&self) -> &Receiver<MergeEvent> {
        &self.events
    }

    pub fn cancellation(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    pub fn cancel(&self) -> bool {
        !self.done && self.cancel.cancel()
    }

    /// Block the calling thread, delivering each event until the run ends.
    pub fn dispatch<P, C>(self, mut on_progress: P, on_complete: C)
    where
        P: FnMut(&ProgressEvent),
        C: FnOnce(MergeOutcome),
    {
        if self.done {
            return;
        }
        loop {
            match self.events.recv() {
                Ok(MergeEvent::Progress(event)) => on_progress(&event),
                Ok(MergeEvent::Complete(outcome)) => return on_complete(outcome),
                Err(_) => return on_complete(lost_worker_outcome()),
            }
        }
    }

    /// Deliver whatever is pending without blocking. Returns `true` once the
    /// terminal event has been delivered; later calls do nothing.
    pub fn try_dispatch<P, C>(&mut self, mut on_progress: P, on_complete: C) -> bool
    where
        P: FnMut(&ProgressEvent),
        C: FnOnce(MergeOutcome),
    {
        if self.done {
            return true;
        }
        loop {
            match self.events.try_recv() {
                Ok(MergeEvent::Progress(event)) => on_progress(&event),
                Ok(MergeEvent::Complete(outcome)) => {
                    self.done = true;
                    on_complete(outcome);
                    return true;
                }
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    self.done = true;
                    on_complete(lost_worker_outcome());
                    return true;
                }
            }
        }
    }

    /// Discard progress and block until the outcome arrives.
    pub fn wait(self) -> MergeOutcome {
        let mut result = None;
        self.dispatch(|_| {}, |outcome| result = Some(outcome));
        result.unwrap_or_else(lost_worker_outcome)
    }
}

fn lost_worker_outcome() -> MergeOutcome {
    let message = "merge worker stopped unexpectedly".to_string();
    let mut log = MergeLog::new();
    log.push(LogEntry::Error(message.clone()));
    MergeOutcome {
        elapsed_seconds: 0,
        log,
        canceled: false,
        failed: true,
        error: Some(message),
    }
}

fn run_worker(
    request: MergeRequest,
    cancel: CancellationSignal,
    finished: Arc<AtomicBool>,
    sender: Sender<MergeEvent>,
) {
    let start = Instant::now();
    let mut log = MergeLog::new();
    let reporter = ChannelReporter {
        sender: sender.clone(),
    };

    let result = prepare_destination(&request, &mut log).and_then(|_| {
        MergeEngine::new(request, cancel).run_into(&mut log, &reporter)
    });

    let (canceled, failed, error) = match result {
        Ok(RunStatus::Completed) => (false, false, None),
        Ok(RunStatus::Canceled) => (true, false, None),
        Err(err) => {
            error!("Merge failed: {}", err);
            log.push(LogEntry::Error(err.to_string()));
            (false, true, Some(err.to_string()))
        }
    };

    let outcome = MergeOutcome {
        elapsed_seconds: start.elapsed().as_secs(),
        log,
        canceled,
        failed,
        error,
    };
    info!(
        "Merge finished in {}s: {} log entries, canceled={}, failed={}",
        outcome.elapsed_seconds,
        outcome.log.len(),
        outcome.canceled,
        outcome.failed
    );

    finished.store(true, Ordering::SeqCst);
    let _ = sender.send(MergeEvent::Complete(outcome));
}

fn prepare_destination(request: &MergeRequest, log: &mut MergeLog) -> Result<()> {
    let destination = request.destination();
    if destination.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(destination).map_err(|source| Error::CreateDir {
        path: destination.to_path_buf(),
        source,
    })?;
    log.push(LogEntry::DestinationCreated(destination.to_path_buf()));
    Ok(())
}
