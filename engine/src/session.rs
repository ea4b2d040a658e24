//! Caller-side state for one user: the current [`Phase`] and the busy flag that keeps
//! a second submission from starting while one is in flight.
//!
//! ```text
//! Idle -> Resolving -> Rendering -> Done
//!             |            |
//!             +------------+-----> Failed
//! ```
//!
//! A new submission always restarts at `Resolving`, no matter where the last one ended.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::debug;
use tokio::sync::watch;

use crate::{
    pipeline::{Outcome, Pipeline, PipelineError, Stage},
    resolver::ConceptQuery,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Resolving {
        query: ConceptQuery,
    },
    Rendering {
        query: ConceptQuery,
    },
    Done(Arc<Outcome>),
    Failed {
        query: ConceptQuery,
        message: String,
    },
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Resolving { .. } | Phase::Rendering { .. })
    }
}

#[derive(Debug)]
pub enum Submission {
    /// The input was blank, nothing was started.
    Empty,
    /// Another submission is still running, this one was dropped.
    Busy,
    Completed(Arc<Outcome>),
    Failed(PipelineError),
}

pub struct Session {
    pipeline: Pipeline,
    busy: AtomicBool,
    phase: watch::Sender<Phase>,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            pipeline,
            busy: AtomicBool::new(false),
            phase,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.phase.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn submit(&self, raw: &str) -> Submission {
        let Ok(query) = ConceptQuery::new(raw) else {
            return Submission::Empty;
        };
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            debug!("Ignoring {query:?}, a submission is already in flight");
            return Submission::Busy;
        };

        self.phase.send_replace(Phase::Resolving {
            query: query.clone(),
        });
        let result = self
            .pipeline
            .run_observed(query.clone(), |stage| {
                if stage == Stage::Rendering {
                    self.phase.send_replace(Phase::Rendering {
                        query: query.clone(),
                    });
                }
            })
            .await;

        match result {
            Ok(outcome) => {
                let outcome = Arc::new(outcome);
                self.phase.send_replace(Phase::Done(outcome.clone()));
                Submission::Completed(outcome)
            }
            Err(e) => {
                self.phase.send_replace(Phase::Failed {
                    query,
                    message: e.to_string(),
                });
                Submission::Failed(e)
            }
        }
    }
}

/// Holds the busy flag for one submission and clears it on drop, even if the
/// submitting future is dropped half way.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
