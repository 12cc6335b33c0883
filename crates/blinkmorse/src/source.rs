//! Face sources.
//!
//! A face source stands in for the camera: it streams face-bounding-box
//! observations into a channel. [`Calibration`] turns each observation into
//! the eyes-open/eyes-closed signal the decoder consumes.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::decoder::Presence;
use crate::error::{Error, Result};

/// Latest timestamp a trace may carry.
pub const MAX_TRACE_OFFSET: Duration = Duration::from_secs(24 * 60 * 60);

/// One face-detection result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    /// Offset from the start of the source.
    pub at: Duration,
    /// Height of the detected face bounding box, or `None` if no face.
    pub face_height: Option<f64>,
}

impl FaceObservation {
    /// An observation of a face of the given height.
    #[must_use]
    pub const fn face(at: Duration, height: f64) -> Self {
        Self {
            at,
            face_height: Some(height),
        }
    }

    /// An observation with no face.
    #[must_use]
    pub const fn no_face(at: Duration) -> Self {
        Self {
            at,
            face_height: None,
        }
    }
}

/// Which face-visibility change counts as the start of a blink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkSignal {
    /// The eyes are closed while the face is not visible.
    #[default]
    FaceLost,
    /// The eyes are closed while the face is visible.
    FaceFound,
}

/// Maps face observations to the blink signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Faces at or below this height are treated as not visible.
    pub min_face_height: f64,
    /// Polarity of the blink signal.
    pub blink_signal: BlinkSignal,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_face_height: 50.0,
            blink_signal: BlinkSignal::FaceLost,
        }
    }
}

impl Calibration {
    /// Whether the observation shows a usable face.
    #[must_use]
    pub fn face_visible(&self, observation: &FaceObservation) -> bool {
        observation
            .face_height
            .is_some_and(|height| height > self.min_face_height)
    }

    /// The blink signal for an observation.
    #[must_use]
    pub fn presence(&self, observation: &FaceObservation) -> Presence {
        let visible = self.face_visible(observation);
        let closed = match self.blink_signal {
            BlinkSignal::FaceLost => !visible,
            BlinkSignal::FaceFound => visible,
        };
        if closed {
            Presence::Closed
        } else {
            Presence::Open
        }
    }
}

/// A provider of face observations.
///
/// Implementors stand in for a camera session: `start` acquires the device
/// and streams observations, `stop` releases it.
#[async_trait::async_trait]
pub trait FaceSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Check if the source is currently streaming.
    fn is_running(&self) -> bool;

    /// Start streaming observations into `tx`.
    ///
    /// Returns when the source is exhausted, stopped, or the receiver is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be acquired.
    async fn start(&mut self, tx: mpsc::Sender<FaceObservation>) -> Result<()>;

    /// Stop streaming. Stopping a stopped source does nothing.
    fn stop(&self);
}

/// A handle to stop a running source from another task.
///
/// Stopping wakes the source immediately, even while it waits for its next
/// observation.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    running: Arc<watch::Sender<bool>>,
}

impl SourceHandle {
    /// Stop the associated source.
    pub fn stop(&self) {
        self.running.send_replace(false);
    }

    /// Check if the source is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }
}

/// Parse a face trace.
///
/// One observation per line: `<seconds> <face_height>` or `<seconds> -` for
/// no face. Blank lines and `#` comments are skipped. Timestamps must not
/// decrease or exceed [`MAX_TRACE_OFFSET`].
///
/// # Errors
///
/// Returns [`Error::TraceParse`] naming the first bad line.
pub fn parse_trace(input: &str) -> Result<Vec<FaceObservation>> {
    let mut observations = Vec::new();
    let mut previous = Duration::ZERO;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(time), Some(height), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::trace_parse(
                line_no,
                "expected `<seconds> <face_height|->`",
            ));
        };

        let seconds: f64 = time
            .parse()
            .map_err(|_| Error::trace_parse(line_no, format!("invalid timestamp {time:?}")))?;
        let at = Duration::try_from_secs_f64(seconds)
            .map_err(|_| Error::trace_parse(line_no, format!("invalid timestamp {time:?}")))?;
        if at > MAX_TRACE_OFFSET {
            return Err(Error::trace_parse(
                line_no,
                format!("timestamp {time:?} is later than {}s", MAX_TRACE_OFFSET.as_secs()),
            ));
        }
        if at < previous {
            return Err(Error::trace_parse(line_no, "timestamps must not decrease"));
        }
        previous = at;

        let face_height = if height == "-" {
            None
        } else {
            let value: f64 = height
                .parse()
                .map_err(|_| Error::trace_parse(line_no, format!("invalid face height {height:?}")))?;
            if !value.is_finite() || value < 0.0 {
                return Err(Error::trace_parse(
                    line_no,
                    format!("invalid face height {height:?}"),
                ));
            }
            Some(value)
        };

        observations.push(FaceObservation { at, face_height });
    }

    Ok(observations)
}

/// Replays recorded face observations in real time.
#[derive(Debug)]
pub struct TraceSource {
    name: String,
    observations: Vec<FaceObservation>,
    running: Arc<watch::Sender<bool>>,
}

impl TraceSource {
    /// Create a source from parsed observations.
    #[must_use]
    pub fn new(name: impl Into<String>, observations: Vec<FaceObservation>) -> Self {
        Self {
            name: name.into(),
            observations,
            running: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Open a trace file.
    ///
    /// # Errors
    ///
    /// A file that cannot be opened is reported as
    /// [`Error::SourceUnavailable`], a failed read as [`Error::Io`] and
    /// malformed content as [`Error::TraceParse`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut file = std::fs::File::open(path)
            .map_err(|e| Error::source_unavailable(&name, e.to_string()))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        let observations = parse_trace(&content)?;
        debug!(path = %name, count = observations.len(), "loaded face trace");
        Ok(Self::new(name, observations))
    }

    /// The observations this source replays.
    #[must_use]
    pub fn observations(&self) -> &[FaceObservation] {
        &self.observations
    }

    /// Offset of the last observation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.observations.last().map_or(Duration::ZERO, |o| o.at)
    }

    /// Get a handle that can stop this source from another task.
    #[must_use]
    pub fn stop_handle(&self) -> SourceHandle {
        SourceHandle {
            running: Arc::clone(&self.running),
        }
    }
}

#[async_trait::async_trait]
impl FaceSource for TraceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    async fn start(&mut self, tx: mpsc::Sender<FaceObservation>) -> Result<()> {
        if self.running.send_replace(true) {
            warn!(source = %self.name, "Face source already running");
            return Ok(());
        }

        debug!(source = %self.name, count = self.observations.len(), "Starting trace replay");
        let mut running = self.running.subscribe();
        let origin = Instant::now();
        let mut result = Ok(());

        for observation in &self.observations {
            let Some(deadline) = origin.checked_add(observation.at) else {
                result = Err(Error::internal(format!(
                    "observation offset {:?} is out of range",
                    observation.at
                )));
                break;
            };
            tokio::select! {
                biased;
                _ = running.wait_for(|running| !running) => {
                    debug!(source = %self.name, "Trace replay stopped");
                    break;
                }
                () = sleep_until(deadline) => {}
                () = tx.closed() => {
                    debug!("Observation channel closed, stopping trace replay");
                    break;
                }
            }
            if tx.send(*observation).await.is_err() {
                debug!("Observation channel closed, stopping trace replay");
                break;
            }
        }

        self.running.send_replace(false);
        debug!(source = %self.name, "Trace replay finished");
        result
    }

    fn stop(&self) {
        if self.running.send_replace(false) {
            debug!(source = %self.name, "Stopping trace replay");
        }
    }
}
