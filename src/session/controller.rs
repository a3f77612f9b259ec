use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    history::HistoryStore,
    models::{Program, SessionRecord},
};

use super::state::{
    LiveAdjustment, ManualPlan, ProgramPlan, SessionPlan, SessionState, SessionStatus, Tick,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub elapsed_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    StateChanged { snapshot: SessionSnapshot },
    Heartbeat { snapshot: SessionSnapshot },
    SessionCompleted { record: SessionRecord },
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Async owner of the session machine. Exactly one ticker task drives
/// `tick()` once per interval while the session runs; it is torn down
/// whenever status leaves `running` so a stale timer can never
/// double-decrement the countdown.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    history: HistoryStore,
    events: broadcast::Sender<SessionEvent>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl SessionController {
    pub fn new(history: HistoryStore) -> Self {
        let debug_mode = std::env::var("THERMAFLOW_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (events, _) = broadcast::channel(64);

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            history,
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    /// Shorten the wall-clock second for tests and demos.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&*self.state.lock().await)
    }

    pub async fn start_manual(&self, plan: ManualPlan) -> Result<SessionSnapshot> {
        self.start(SessionPlan::Manual(plan)).await
    }

    /// Start a program session. The segment list is copied out of the
    /// catalog program; later catalog mutations cannot affect the run.
    pub async fn start_program(&self, program: &Program) -> Result<SessionSnapshot> {
        self.start(SessionPlan::Program(ProgramPlan {
            program_id: program.id.clone(),
            program_name: program.name.clone(),
            duration_min: program.duration_min,
            segments: program.segments.clone(),
        }))
        .await
    }

    async fn start(&self, plan: SessionPlan) -> Result<SessionSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.start(plan, Utc::now())?;
            snapshot_of(&state)
        };

        info!(
            "session started: {} ({} min)",
            snapshot.state.plan.display_name(),
            snapshot.state.total_duration_min
        );

        self.spawn_ticker().await;
        self.emit(SessionEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    pub async fn pause(&self) -> Result<SessionSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.pause()?;
            snapshot_of(&state)
        };

        self.cancel_ticker().await;
        self.emit(SessionEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    pub async fn resume(&self) -> Result<SessionSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.resume()?;
            snapshot_of(&state)
        };

        self.spawn_ticker().await;
        self.emit(SessionEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// End the session by user action. Natural completion is handled by the
    /// ticker itself when the countdown reaches zero.
    pub async fn stop(&self, completed: bool) -> Result<SessionRecord> {
        let (record, snapshot) = {
            let mut state = self.state.lock().await;
            let record = state.stop(completed, Utc::now())?;
            (record, snapshot_of(&state))
        };

        self.cancel_ticker().await;
        self.history.append(record.clone());

        info!(
            "session stopped: {} ({} min, score {})",
            record.name, record.duration_min, record.score
        );

        self.emit(SessionEvent::StateChanged { snapshot });
        self.emit(SessionEvent::SessionCompleted {
            record: record.clone(),
        });
        Ok(record)
    }

    pub async fn adjust(&self, adjustment: LiveAdjustment) -> Result<SessionSnapshot> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.set_live_override(adjustment)?;
            snapshot_of(&state)
        };

        self.emit(SessionEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }

        let state = self.state.clone();
        let history = self.history.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval =
                time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let outcome = {
                            let mut guard = state.lock().await;
                            if guard.status != SessionStatus::Running {
                                break;
                            }
                            match guard.tick(1, Utc::now()) {
                                Ok(Tick::Finished(record)) => {
                                    history.append(record.clone());
                                    Some((snapshot_of(&guard), Some(record)))
                                }
                                Ok(Tick::Running { segment_changed }) => {
                                    ticks = ticks.wrapping_add(1);
                                    if segment_changed || ticks % heartbeat_every == 0 {
                                        Some((snapshot_of(&guard), None))
                                    } else {
                                        None
                                    }
                                }
                                Err(err) => {
                                    warn!("ticker stopped: {err}");
                                    break;
                                }
                            }
                        };

                        match outcome {
                            Some((snapshot, Some(record))) => {
                                info!(
                                    "session completed: {} ({} min)",
                                    record.name, record.duration_min
                                );
                                let _ = events.send(SessionEvent::StateChanged { snapshot });
                                let _ = events.send(SessionEvent::SessionCompleted { record });
                                break;
                            }
                            Some((snapshot, None)) => {
                                let _ = events.send(SessionEvent::Heartbeat { snapshot });
                            }
                            None => {}
                        }
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

fn snapshot_of(state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        elapsed_secs: state.elapsed_secs(),
        state: state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompressionMode, ProgramSegment, RecordKind, SegmentKind};

    const TICK: Duration = Duration::from_millis(5);

    fn controller() -> SessionController {
        SessionController::new(HistoryStore::new()).with_tick_interval(TICK)
    }

    fn short_program() -> Program {
        let segments = vec![ProgramSegment {
            id: "1".into(),
            name: "Deep Cool".into(),
            duration_min: 1,
            kind: SegmentKind::Cold,
            temperature: Some(10),
            compression_level: Some(2),
            compression_mode: Some(CompressionMode::Wave),
        }];
        Program {
            id: "official-2".into(),
            name: "Deep Cold Therapy".into(),
            description: "10°C Continuous".into(),
            duration_min: 1,
            segment_label: Program::segment_label_for(segments.len()),
            segments,
        }
    }

    async fn settle() {
        tokio::time::sleep(TICK * 4).await;
    }

    #[tokio::test]
    async fn start_emits_state_changed() {
        let controller = controller();
        let mut events = controller.subscribe();

        controller.start_manual(ManualPlan::default()).await.unwrap();

        match events.recv().await.unwrap() {
            SessionEvent::StateChanged { snapshot } => {
                assert_eq!(snapshot.state.status, SessionStatus::Running);
                assert_eq!(snapshot.state.time_left_secs, 15 * 60);
            }
            other => panic!("expected stateChanged, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ticker_counts_down_while_running() {
        let controller = controller();
        controller.start_manual(ManualPlan::default()).await.unwrap();

        tokio::time::sleep(TICK * 10).await;

        let snapshot = controller.snapshot().await;
        assert!(snapshot.state.time_left_secs < 15 * 60);
        assert!(snapshot.elapsed_secs > 0);
    }

    #[tokio::test]
    async fn stop_produces_exactly_one_record_and_resets() {
        let controller = controller();
        controller.start_manual(ManualPlan::default()).await.unwrap();
        tokio::time::sleep(TICK * 10).await;

        let record = controller.stop(false).await.unwrap();
        assert_eq!(record.kind, RecordKind::Manual);
        assert_eq!(controller.history().len(), 1);
        assert_eq!(
            controller.history().last_completed().unwrap().id,
            record.id
        );

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state.status, SessionStatus::Idle);

        // countdown no longer moves once idle
        let frozen = controller.snapshot().await.state.time_left_secs;
        settle().await;
        assert_eq!(controller.snapshot().await.state.time_left_secs, frozen);
    }

    #[tokio::test]
    async fn pause_freezes_the_countdown() {
        let controller = controller();
        controller.start_manual(ManualPlan::default()).await.unwrap();
        tokio::time::sleep(TICK * 5).await;

        controller.pause().await.unwrap();
        let frozen = controller.snapshot().await.state.time_left_secs;

        settle().await;
        assert_eq!(controller.snapshot().await.state.time_left_secs, frozen);

        controller.resume().await.unwrap();
        settle().await;
        assert!(controller.snapshot().await.state.time_left_secs < frozen);
    }

    #[tokio::test]
    async fn natural_completion_appends_record_and_emits_event() {
        let controller = controller();
        let mut events = controller.subscribe();

        controller.start_program(&short_program()).await.unwrap();

        // 60 ticked seconds at 5 ms per tick
        let completed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SessionCompleted { record }) => break record,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(err) => panic!("event stream closed: {err}"),
                }
            }
        })
        .await
        .expect("session did not complete in time");

        assert_eq!(completed.score, 100);
        assert_eq!(completed.duration_min, 1);
        assert_eq!(completed.kind, RecordKind::Program);
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.snapshot().await.state.status, SessionStatus::Idle);
    }

    #[tokio::test]
    async fn adjust_requires_active_session() {
        let controller = controller();
        assert!(controller
            .adjust(LiveAdjustment::Temperature(8))
            .await
            .is_err());

        controller.start_manual(ManualPlan::default()).await.unwrap();
        let snapshot = controller
            .adjust(LiveAdjustment::Temperature(8))
            .await
            .unwrap();
        assert_eq!(snapshot.state.live_overrides.temperature, Some(8));
    }

    #[tokio::test]
    async fn start_rejected_while_running() {
        let controller = controller();
        controller.start_manual(ManualPlan::default()).await.unwrap();
        assert!(controller.start_manual(ManualPlan::default()).await.is_err());
    }
}
