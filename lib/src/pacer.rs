use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use crate::frame::Frame;

pub const DEFAULT_BUFFER_CAPACITY: usize = 5;

/// number of per-frame fps samples kept for smoothing
const FPS_WINDOW: usize = 30;
/// gap above which the producer or caller is considered stalled
const STALL_SECONDS: f64 = 0.080;
/// ring buffer occupancy ratio at which backpressure kicks in
const BACKPRESSURE_RATIO: f64 = 0.9;
/// fps estimate above which every other frame is decimated
const DECIMATION_FPS: f64 = 35.0;

/// performance metrics derived from the frames passing through a pacer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameMetrics {
    /// rolling fps estimate over the sample window
    pub fps: f64,
    /// seconds since the previous frame arrived
    pub frame_time: f64,
    /// frames skipped by the admission policy since the last clear
    pub dropped_frames: u64,
    /// occupied ring buffer slots relative to capacity, 0.0 to 1.0
    pub buffer_usage: f64,
}

struct PacerState {
    buffer: VecDeque<Frame>,
    capacity: usize,
    fps_window: VecDeque<f64>,
    metrics: FrameMetrics,
    last_frame: Instant,
    skip_next: bool,
}

/// admission policy between a bursty frame producer and the display
///
/// frames are accepted into a bounded ring buffer or dropped depending on arrival
/// timing, buffer occupancy and the rolling fps estimate; the most recent accepted
/// frame stays available to the render side through [`latest`](FramePacer::latest)
///
/// all operations are safe to call concurrently from a capture and a render context
pub struct FramePacer {
    state: Mutex<PacerState>,
}

impl FramePacer {
    /// create a pacer holding at most `capacity` accepted frames
    pub fn new(capacity: usize) -> Self {
        let state = PacerState {
            buffer: VecDeque::new(),
            capacity: capacity.max(1),
            fps_window: VecDeque::new(),
            metrics: FrameMetrics::default(),
            last_frame: Instant::now(),
            skip_next: false,
        };

        Self { state: Mutex::new(state) }
    }

    /// run a frame through the admission policy
    ///
    /// returns the frame and updated metrics when it was accepted into the ring
    /// buffer, or `None` and the metrics when the policy decided to drop it
    pub fn accept(&self, frame: Frame) -> (Option<Frame>, FrameMetrics) {
        self.accept_at(frame, Instant::now())
    }

    fn accept_at(&self, frame: Frame, now: Instant) -> (Option<Frame>, FrameMetrics) {
        let mut state = self.state.lock().expect("pacer lock should not be poisoned");

        let frame_time = now.duration_since(state.last_frame).as_secs_f64();
        state.last_frame = now;

        if frame_time > 0.0 {
            if state.fps_window.len() == FPS_WINDOW {
                state.fps_window.pop_front();
            }
            state.fps_window.push_back(1.0 / frame_time);
        }

        let decision = skip_frame(frame_time, state.buffer.len(), state.capacity, state.metrics.fps, state.skip_next);
        state.skip_next = decision.flag;
        if decision.skip {
            state.metrics.dropped_frames += 1;
            return (None, state.metrics);
        }

        if state.buffer.len() == state.capacity {
            state.buffer.pop_front();
        }
        state.buffer.push_back(frame.clone());

        state.metrics.fps = match state.fps_window.len() {
            0 => 0.0,
            samples => state.fps_window.iter().sum::<f64>() / samples as f64,
        };
        state.metrics.frame_time = frame_time;
        state.metrics.buffer_usage = state.buffer.len() as f64 / state.capacity as f64;

        (Some(frame), state.metrics)
    }

    /// the most recently accepted frame, `None` when the buffer is empty
    pub fn latest(&self) -> Option<Frame> {
        let state = self.state.lock().expect("pacer lock should not be poisoned");
        state.buffer.back().cloned()
    }

    /// empty the ring buffer and reset all metrics and policy state
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("pacer lock should not be poisoned");
        state.buffer.clear();
        state.fps_window.clear();
        state.metrics = FrameMetrics::default();
        state.last_frame = Instant::now();
        state.skip_next = false;
    }

    /// a consistent snapshot of the current metrics
    pub fn metrics(&self) -> FrameMetrics {
        let mut state = self.state.lock().expect("pacer lock should not be poisoned");
        state.metrics.buffer_usage = state.buffer.len() as f64 / state.capacity as f64;
        state.metrics
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkipDecision {
    skip: bool,
    flag: bool,
}

/// decide whether a frame should be dropped, first matching rule wins
///
/// `flag` carries the alternating decimation state and must be written back by the
/// caller regardless of the decision
fn skip_frame(frame_time: f64, occupancy: usize, capacity: usize, fps: f64, skip_next: bool) -> SkipDecision {
    if frame_time > STALL_SECONDS {
        return SkipDecision { skip: true, flag: skip_next };
    }

    if occupancy as f64 >= capacity as f64 * BACKPRESSURE_RATIO {
        return SkipDecision { skip: true, flag: skip_next };
    }

    if fps > DECIMATION_FPS {
        return SkipDecision { skip: !skip_next, flag: !skip_next };
    }

    SkipDecision { skip: false, flag: skip_next }
}
