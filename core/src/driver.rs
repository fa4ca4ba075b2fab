//! Synchronous executor for session effects.
//!
//! Fetches run one at a time against a [`Backend`] and their completions go straight back into
//! the session. Timers are collected and only fire when asked, so callers control time.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::api::{Backend, FetchResult, SearchHit};
use crate::session::{Command, Effect, FetchRequest, GridStatus, Method, Session, Timer, ToastKind};

/// Everything the session asked for that is not a fetch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DriverReport {
    pub fetched: Vec<String>,
    pub toasts: Vec<(ToastKind, String)>,
    pub scheduled: Vec<(Timer, u64)>,
    pub grid: Vec<(usize, GridStatus)>,
    pub search_results: Option<Vec<SearchHit>>,
    pub downloads: Vec<(String, String)>,
}

impl DriverReport {
    fn absorb(&mut self, other: DriverReport) {
        self.fetched.extend(other.fetched);
        self.toasts.extend(other.toasts);
        self.scheduled.extend(other.scheduled);
        self.grid.extend(other.grid);
        if other.search_results.is_some() {
            self.search_results = other.search_results;
        }
        self.downloads.extend(other.downloads);
    }

    pub fn has_error_toast(&self) -> bool {
        self.toasts.iter().any(|(kind, _)| *kind == ToastKind::Error)
    }
}

#[derive(Debug)]
pub struct Driver<B> {
    backend: B,
    pending_timers: Vec<(Timer, u64)>,
}

impl<B: Backend> Driver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, pending_timers: Vec::new() }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn pending_timers(&self) -> &[(Timer, u64)] {
        &self.pending_timers
    }

    /// Execute `effects` and everything they lead to, except timers.
    pub fn run(&mut self, session: &mut Session, effects: Vec<Effect>) -> DriverReport {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut report = DriverReport::default();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Fetch(request) => {
                    let result = self.execute(&request);
                    report.fetched.push(request.url);
                    queue.extend(session.update(Command::Completed { ticket: request.ticket, result }));
                }
                Effect::Schedule { timer, after_ms } => {
                    self.pending_timers.push((timer, after_ms));
                    report.scheduled.push((timer, after_ms));
                }
                Effect::Toast { kind, message } => report.toasts.push((kind, message)),
                Effect::GridThumbnail { index, status } => report.grid.push((index, status)),
                Effect::SearchResults(results) => report.search_results = Some(results),
                Effect::Download { url, file_name } => report.downloads.push((url, file_name)),
            }
        }
        report
    }

    /// Shorthand for `run(session, session.update(command))`.
    pub fn dispatch(&mut self, session: &mut Session, command: Command) -> DriverReport {
        let effects = session.update(command);
        self.run(session, effects)
    }

    /// Fire pending one-shot timers until none are left. The periodic cache cleanup stays pending.
    pub fn fire_timers(&mut self, session: &mut Session) -> DriverReport {
        let mut report = DriverReport::default();
        loop {
            let (due, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_timers)
                .into_iter()
                .partition(|(timer, _)| *timer != Timer::CacheCleanup);
            self.pending_timers = keep;
            if due.is_empty() {
                break;
            }
            for (timer, after_ms) in due {
                trace!(target: "driver", ?timer, after_ms, "firing timer");
                report.absorb(self.dispatch(session, Command::TimerFired(timer)));
            }
        }
        report
    }

    fn execute(&self, request: &FetchRequest) -> FetchResult {
        debug!(target: "driver", url = %request.url, "fetch");
        match &request.method {
            Method::Get => self.backend.get(&request.url),
            Method::PostJson(body) => self.backend.post_json(&request.url, body),
        }
    }
}
