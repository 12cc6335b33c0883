//! Tick-driven blink detection.
//!
//! The [`BlinkDetector`] owns a [`Decoder`]. Face observations arrive on an
//! mpsc channel and only update the current signal level; a fixed-interval
//! ticker samples that level and steps the decoder. Every change to the
//! decoded state is published as a [`Snapshot`] on a watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::decoder::{Decoder, DecoderConfig, DecoderEvent, Presence, Sample, Snapshot};
use crate::error::{Error, Result};
use crate::source::{Calibration, FaceObservation};

/// Settings for a [`BlinkDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Interval between samples of the blink signal.
    pub sample_interval: Duration,
    /// Decoder thresholds and policies.
    pub decoder: DecoderConfig,
    /// Mapping from face observations to the blink signal.
    pub calibration: Calibration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(200),
            decoder: DecoderConfig::default(),
            calibration: Calibration::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Reset,
    Stop,
}

/// Runs a decoder against a stream of face observations.
#[derive(Debug)]
pub struct BlinkDetector {
    config: DetectorConfig,
    decoder: Decoder,
    running: Arc<AtomicBool>,
    control_tx: mpsc::UnboundedSender<Control>,
    control_rx: mpsc::UnboundedReceiver<Control>,
    snapshot_tx: watch::Sender<Snapshot>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl BlinkDetector {
    /// Create a detector.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        Self {
            decoder: Decoder::new(config.decoder.clone()),
            config,
            running: Arc::new(AtomicBool::new(false)),
            control_tx,
            control_rx,
            snapshot_tx,
            snapshot_rx,
        }
    }

    /// The detector's configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Check if the detector loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get a handle to control and observe the detector from other tasks.
    #[must_use]
    pub fn handle(&self) -> DetectorHandle {
        DetectorHandle {
            running: Arc::clone(&self.running),
            control: self.control_tx.clone(),
            snapshot: self.snapshot_rx.clone(),
        }
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Sample observations until stopped or until the source closes.
    ///
    /// When the observation channel closes, the latest level is sampled once
    /// more and any pending letter is committed. Returns the final snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector is already running.
    pub async fn run(&mut self, mut observations: mpsc::Receiver<FaceObservation>) -> Result<Snapshot> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Blink detector already running");
            return Err(Error::internal("blink detector already running"));
        }
        // Drop controls left over from an earlier run.
        while self.control_rx.try_recv().is_ok() {}

        info!(
            interval_ms = self.config.sample_interval.as_millis(),
            "Starting blink detector"
        );

        let origin = Instant::now();
        let mut ticker = interval(self.config.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut presence = Presence::Unknown;

        loop {
            tokio::select! {
                biased;

                control = self.control_rx.recv() => match control {
                    Some(Control::Reset) => {
                        let events = self.decoder.reset();
                        self.apply(&events);
                    }
                    Some(Control::Stop) | None => {
                        debug!("Stop requested");
                        break;
                    }
                },

                observation = observations.recv() => match observation {
                    Some(observation) => {
                        trace!(?observation, "face observation");
                        presence = self.config.calibration.presence(&observation);
                    }
                    None => {
                        debug!("Observation channel closed, stopping detector");
                        let events = self.decoder.step(Sample::new(origin.elapsed(), presence));
                        self.apply(&events);
                        break;
                    }
                },

                _ = ticker.tick() => {
                    let events = self.decoder.step(Sample::new(origin.elapsed(), presence));
                    self.apply(&events);
                }
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
        }

        let events = self.decoder.flush();
        self.apply(&events);
        self.running.store(false, Ordering::SeqCst);

        let snapshot = self.snapshot();
        info!(text = %snapshot.text, "Blink detector stopped");
        Ok(snapshot)
    }

    fn apply(&mut self, events: &[DecoderEvent]) {
        if events.is_empty() {
            return;
        }
        for event in events {
            trace!(?event, "decoder event");
        }

        let next = Snapshot::from(self.decoder.state());
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// A cloneable handle to a [`BlinkDetector`].
#[derive(Debug, Clone)]
pub struct DetectorHandle {
    running: Arc<AtomicBool>,
    control: mpsc::UnboundedSender<Control>,
    snapshot: watch::Receiver<Snapshot>,
}

impl DetectorHandle {
    /// Stop the detector. Stopping a stopped detector does nothing.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("Stopping blink detector");
            let _ = self.control.send(Control::Stop);
        }
    }

    /// Clear all decoded state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetectorStopped`] if the detector has been dropped.
    pub fn reset(&self) -> Result<()> {
        self.control
            .send(Control::Reset)
            .map_err(|_| Error::DetectorStopped)
    }

    /// Check if the detector loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }
}
