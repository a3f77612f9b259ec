use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    limits, CompressionMode, ConfigSnapshot, ProgramSegment, RecordKind, SessionRecord, Treatment,
    TreatmentMode,
};

use super::errors::SessionError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    Manual,
    Program,
}

/// Flat configuration of a manual session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualPlan {
    pub duration_min: u32,
    pub treatment: Treatment,
    pub compression_level: u8,
    pub compression_mode: CompressionMode,
}

impl Default for ManualPlan {
    fn default() -> Self {
        Self {
            duration_min: limits::DEFAULT_DURATION_MIN,
            treatment: Treatment::Cold {
                temperature: limits::DEFAULT_COLD_TEMP_C,
            },
            compression_level: limits::DEFAULT_COMPRESSION_LEVEL,
            compression_mode: CompressionMode::Overall,
        }
    }
}

/// Program identity plus the segment list copied in at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPlan {
    pub program_id: String,
    pub program_name: String,
    pub duration_min: u32,
    pub segments: Vec<ProgramSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPlan {
    Manual(ManualPlan),
    Program(ProgramPlan),
}

impl SessionPlan {
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionPlan::Manual(_) => SessionMode::Manual,
            SessionPlan::Program(_) => SessionMode::Program,
        }
    }

    pub fn duration_min(&self) -> u32 {
        match self {
            SessionPlan::Manual(plan) => plan.duration_min,
            SessionPlan::Program(plan) => plan.duration_min,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            SessionPlan::Manual(_) => "Manual Session".to_string(),
            SessionPlan::Program(plan) => plan.program_name.clone(),
        }
    }

    pub fn temperature(&self) -> Option<i32> {
        match self {
            SessionPlan::Manual(plan) => plan.treatment.temperature(),
            SessionPlan::Program(_) => None,
        }
    }

    pub fn compression_level(&self) -> Option<u8> {
        match self {
            SessionPlan::Manual(plan) => Some(plan.compression_level),
            SessionPlan::Program(_) => None,
        }
    }

    pub fn compression_mode(&self) -> Option<CompressionMode> {
        match self {
            SessionPlan::Manual(plan) => Some(plan.compression_mode),
            SessionPlan::Program(_) => None,
        }
    }

    pub fn treatment_mode(&self) -> Option<TreatmentMode> {
        match self {
            SessionPlan::Manual(plan) => Some(plan.treatment.mode()),
            SessionPlan::Program(_) => None,
        }
    }

    pub fn segments(&self) -> Option<&[ProgramSegment]> {
        match self {
            SessionPlan::Manual(_) => None,
            SessionPlan::Program(plan) => Some(&plan.segments),
        }
    }
}

/// Sparse patch of user-issued live changes. Superseded wholesale by the
/// new segment's own values at every segment boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LiveOverrides {
    pub temperature: Option<i32>,
    pub compression_level: Option<u8>,
}

impl LiveOverrides {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.compression_level.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "param", content = "value", rename_all = "camelCase")]
pub enum LiveAdjustment {
    Temperature(i32),
    CompressionLevel(u8),
}

/// Outcome of advancing the countdown.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Running { segment_changed: bool },
    Finished(SessionRecord),
}

/// Index of the segment whose cumulative time window contains `elapsed_secs`.
/// Boundaries are closed on the left: a segment becomes active the instant
/// elapsed time reaches its start. Elapsed time past the final boundary
/// resolves to the last segment.
pub fn active_segment_index(segments: &[ProgramSegment], elapsed_secs: u32) -> usize {
    let mut segment_start = 0u32;
    for (index, segment) in segments.iter().enumerate() {
        if elapsed_secs < segment_start + segment.duration_secs() {
            return index;
        }
        segment_start += segment.duration_secs();
    }
    segments.len().saturating_sub(1)
}

/// The single mutable record describing the in-progress or idle session.
///
/// Lifecycle: created once in `idle` with the default manual plan, cycles
/// through `running`/`paused`, and resets back to the same idle shape when
/// the session stops or completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub plan: SessionPlan,
    pub started_at: Option<DateTime<Utc>>,
    pub total_duration_min: u32,
    pub time_left_secs: u32,
    pub current_segment_index: Option<usize>,
    pub live_overrides: LiveOverrides,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            plan: SessionPlan::Manual(ManualPlan::default()),
            started_at: None,
            total_duration_min: limits::DEFAULT_DURATION_MIN,
            time_left_secs: limits::DEFAULT_DURATION_MIN * 60,
            current_segment_index: None,
            live_overrides: LiveOverrides::default(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SessionMode {
        self.plan.mode()
    }

    pub fn elapsed_secs(&self) -> u32 {
        (self.total_duration_min * 60).saturating_sub(self.time_left_secs)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Running | SessionStatus::Paused)
    }

    /// Begin a session. Only valid from `idle`; the plan must have a
    /// positive duration and, for programs, at least one segment.
    pub fn start(&mut self, plan: SessionPlan, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::invalid("start", self.status));
        }
        if plan.duration_min() == 0 {
            return Err(SessionError::ZeroDuration);
        }
        if let SessionPlan::Program(program) = &plan {
            if program.segments.is_empty() {
                return Err(SessionError::EmptyProgram);
            }
        }

        let duration_min = plan.duration_min();
        let current_segment_index = match plan.mode() {
            SessionMode::Program => Some(0),
            SessionMode::Manual => None,
        };

        *self = Self {
            status: SessionStatus::Running,
            plan,
            started_at: Some(now),
            total_duration_min: duration_min,
            time_left_secs: duration_min * 60,
            current_segment_index,
            live_overrides: LiveOverrides::default(),
        };
        Ok(())
    }

    /// Advance the countdown by `seconds`. Reaching zero is equivalent to
    /// `stop(completed = true)`. In program mode the active segment is
    /// recomputed; crossing a boundary hard-overwrites the live overrides
    /// with the new segment's authored defaults.
    pub fn tick(&mut self, seconds: u32, now: DateTime<Utc>) -> Result<Tick, SessionError> {
        if self.status != SessionStatus::Running {
            return Err(SessionError::invalid("tick", self.status));
        }

        self.time_left_secs = self.time_left_secs.saturating_sub(seconds);
        if self.time_left_secs == 0 {
            return Ok(Tick::Finished(self.finish(true, now)));
        }

        let elapsed = self.elapsed_secs();
        let change = match &self.plan {
            SessionPlan::Program(program) => {
                let next = active_segment_index(&program.segments, elapsed);
                if Some(next) != self.current_segment_index {
                    let segment = &program.segments[next];
                    Some((
                        next,
                        LiveOverrides {
                            temperature: segment.temperature,
                            compression_level: segment.compression_level,
                        },
                    ))
                } else {
                    None
                }
            }
            SessionPlan::Manual(_) => None,
        };

        let segment_changed = change.is_some();
        if let Some((next, overrides)) = change {
            self.current_segment_index = Some(next);
            self.live_overrides = overrides;
        }

        Ok(Tick::Running { segment_changed })
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Running {
            return Err(SessionError::invalid("pause", self.status));
        }
        self.status = SessionStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Paused {
            return Err(SessionError::invalid("resume", self.status));
        }
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// End the session, producing the history record and resetting the
    /// machine to the default idle shape.
    pub fn stop(
        &mut self,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, SessionError> {
        if !self.is_active() {
            return Err(SessionError::invalid("stop", self.status));
        }
        Ok(self.finish(completed, now))
    }

    /// Record a live parameter change. Leaves the other override and every
    /// config field untouched. Range clamping is the caller's concern.
    pub fn set_live_override(&mut self, adjustment: LiveAdjustment) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::invalid("adjust", self.status));
        }
        match adjustment {
            LiveAdjustment::Temperature(value) => {
                self.live_overrides.temperature = Some(value);
            }
            LiveAdjustment::CompressionLevel(value) => {
                self.live_overrides.compression_level = Some(value);
            }
        }
        Ok(())
    }

    fn finish(&mut self, completed: bool, now: DateTime<Utc>) -> SessionRecord {
        let elapsed_min = (self.elapsed_secs() + 30) / 60;
        let completion_rate = if elapsed_min > 0 {
            elapsed_min as f64 / self.total_duration_min as f64 * 100.0
        } else {
            0.0
        };
        let score = if completed {
            100
        } else {
            completion_rate.round().min(100.0) as u8
        };

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            ended_at: now,
            name: self.plan.display_name(),
            duration_min: elapsed_min,
            score,
            kind: match self.mode() {
                SessionMode::Manual => RecordKind::Manual,
                SessionMode::Program => RecordKind::Program,
            },
            config: ConfigSnapshot {
                temperature: self.live_overrides.temperature.or(self.plan.temperature()),
                compression_level: self
                    .live_overrides
                    .compression_level
                    .or(self.plan.compression_level()),
                compression_mode: self.plan.compression_mode(),
                treatment_mode: self.plan.treatment_mode(),
            },
        };

        *self = Self::default();
        record
    }
}
