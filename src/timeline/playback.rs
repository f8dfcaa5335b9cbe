use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{RankedFrame, TimelineFrame};
use crate::analyzers::types::Metric;

/// Receives one ranked frame per playback tick.
pub trait FrameSink: Send + Sync {
    fn render(&self, frame: &RankedFrame);

    /// Called once when the cursor runs past the last frame.
    fn finished(&self) {}
}

/// Message sent by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Frame(RankedFrame),
    Finished,
}

/// Forwards frames over an unbounded channel; a closed receiver is ignored.
pub struct ChannelSink(UnboundedSender<PlaybackEvent>);

impl ChannelSink {
    pub fn new(tx: UnboundedSender<PlaybackEvent>) -> Self {
        Self(tx)
    }
}

impl FrameSink for ChannelSink {
    fn render(&self, frame: &RankedFrame) {
        let _ = self.0.send(PlaybackEvent::Frame(frame.clone()));
    }

    fn finished(&self) {
        let _ = self.0.send(PlaybackEvent::Finished);
    }
}

/// Timer-driven cursor over a frame sequence.
///
/// At most one tick task exists at a time: [`Playback::start`] aborts the
/// running one before spawning, and dropping the playback aborts it too.
pub struct Playback {
    frames: Arc<Vec<TimelineFrame>>,
    metric: Metric,
    limit: usize,
    cursor: Arc<AtomicUsize>,
    task: Option<JoinHandle<()>>,
}

impl Playback {
    pub fn new(frames: Vec<TimelineFrame>, metric: Metric, limit: usize) -> Self {
        Self {
            frames: Arc::new(frames),
            metric,
            limit,
            cursor: Arc::new(AtomicUsize::new(0)),
            task: None,
        }
    }

    pub fn frames(&self) -> &[TimelineFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the next frame to render.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn is_playing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Starts ticking every `speed`, rendering the frame at the cursor and
    /// then advancing it. Resumes from the current cursor; an exhausted
    /// cursor rewinds to the first frame.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(&mut self, speed: Duration, sink: Arc<dyn FrameSink>) {
        self.stop_timer();

        if self.cursor() >= self.frames.len() {
            self.cursor.store(0, Ordering::SeqCst);
        }

        let period = speed.max(Duration::from_millis(1));
        let frames = Arc::clone(&self.frames);
        let cursor = Arc::clone(&self.cursor);
        let metric = self.metric;
        let limit = self.limit;
        let first_tick = Instant::now() + period;

        info!(
            frames = frames.len(),
            from = self.cursor(),
            speed_ms = period.as_millis() as u64,
            "Playback started"
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let index = cursor.load(Ordering::SeqCst);
                let Some(frame) = frames.get(index) else {
                    debug!(index, "Playback reached the end");
                    sink.finished();
                    break;
                };

                sink.render(&RankedFrame {
                    index,
                    total: frames.len(),
                    label: frame.label.clone(),
                    metric,
                    districts: frame.ranked(metric, limit),
                });
                cursor.store(index + 1, Ordering::SeqCst);
            }
        }));
    }

    /// Stops ticking and keeps the cursor where it is.
    pub fn pause(&mut self) {
        if self.stop_timer() {
            info!(cursor = self.cursor(), "Playback paused");
        }
    }

    /// Stops ticking and rewinds to the first frame.
    pub fn reset(&mut self) {
        self.stop_timer();
        self.cursor.store(0, Ordering::SeqCst);
        info!("Playback reset");
    }

    fn stop_timer(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
