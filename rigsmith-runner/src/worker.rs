//! Background assembly worker.
//!
//! Owns an [`Engine`] on its own thread and answers [`WorkerCommand`]s over
//! `mpsc` channels, so a single-threaded caller (CLI, UI loop) never blocks
//! on assembly. A failed command is answered with
//! [`WorkerResponse::Failed`]; the worker keeps running.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rigsmith_core::{Build, Scenario};

use crate::engine::Engine;
use crate::sampling::{SamplingConfig, SamplingReport};

/// Commands sent from the caller to the worker.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    Tiers {
        budget: f64,
    },
    Smart {
        scenario: Scenario,
        budget: f64,
        /// Also score the smart build with the scenario's model.
        score: bool,
    },
    Sample {
        scenario: Scenario,
        budget: f64,
        /// Engine defaults when `None`.
        config: Option<SamplingConfig>,
    },
    Shutdown,
}

/// Responses sent from the worker back to the caller.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Tiers {
        builds: Vec<Build>,
    },
    Smart {
        build: Box<Build>,
    },
    Sampled {
        report: Box<SamplingReport>,
    },
    Failed {
        command: &'static str,
        error: String,
    },
}

/// Caller-side handle: the command sender, the response receiver and the
/// thread handle.
pub struct AssemblyWorker {
    tx: Sender<WorkerCommand>,
    rx: Receiver<WorkerResponse>,
    handle: Option<JoinHandle<()>>,
}

impl AssemblyWorker {
    /// Move `engine` onto a new worker thread.
    pub fn spawn(engine: Engine) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(engine, cmd_rx, resp_tx)?;
        Ok(Self {
            tx: cmd_tx,
            rx: resp_rx,
            handle: Some(handle),
        })
    }

    /// Queue a command. `false` when the worker has already stopped.
    pub fn send(&self, cmd: WorkerCommand) -> bool {
        self.tx.send(cmd).is_ok()
    }

    /// Block for the next response. `None` once the worker has stopped.
    pub fn recv(&self) -> Option<WorkerResponse> {
        self.rx.recv().ok()
    }

    /// Next response if one is ready.
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.rx.try_recv().ok()
    }

    /// Send a command and wait for its response.
    pub fn request(&self, cmd: WorkerCommand) -> Option<WorkerResponse> {
        if self.send(cmd) {
            self.recv()
        } else {
            None
        }
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("assembly worker panicked");
            }
        }
    }
}

impl Drop for AssemblyWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    engine: Engine,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("rigsmith-worker".into())
        .spawn(move || {
            worker_loop(engine, rx, tx);
        })
}

fn worker_loop(engine: Engine, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                let Some(response) = handle_command(&engine, cmd) else {
                    break;
                };
                if tx.send(response).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("assembly worker stopped");
}

fn handle_command(engine: &Engine, cmd: WorkerCommand) -> Option<WorkerResponse> {
    let failed = |command: &'static str, error: String| {
        tracing::warn!(command, %error, "worker command failed");
        WorkerResponse::Failed { command, error }
    };

    let response = match cmd {
        WorkerCommand::Tiers { budget } => match engine.assemble_tiers(budget) {
            Ok(builds) => WorkerResponse::Tiers { builds },
            Err(e) => failed("tiers", e.to_string()),
        },
        WorkerCommand::Smart { scenario, budget, score } => {
            let result = engine.assemble_smart(scenario, budget).and_then(|build| {
                if score {
                    let s = engine.score_build(scenario, &build)?;
                    Ok(build.with_score(s))
                } else {
                    Ok(build)
                }
            });
            match result {
                Ok(build) => WorkerResponse::Smart { build: Box::new(build) },
                Err(e) => failed("smart", e.to_string()),
            }
        }
        WorkerCommand::Sample { scenario, budget, config } => {
            let config = config.unwrap_or_else(|| engine.sampling_config().clone());
            match engine.sample(scenario, budget, &config) {
                Ok(report) => WorkerResponse::Sampled { report: Box::new(report) },
                Err(e) => failed("sample", e.to_string()),
            }
        }
        WorkerCommand::Shutdown => return None, // handled in loop
    };
    Some(response)
}
