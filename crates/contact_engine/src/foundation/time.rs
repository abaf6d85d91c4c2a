//! Per-frame simulation context

/// Values every simulation step needs for the current frame
///
/// Built once per frame and passed by reference to whatever needs the
/// delta time, instead of reading it from global state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds elapsed since the previous frame
    pub delta_time: f32,
    /// Seconds elapsed since the simulation started
    pub total_time: f32,
    /// Index of this frame, starting at 0
    pub frame: u64,
}

impl FrameContext {
    /// Context for a fixed-step frame, useful for tests and replay
    pub fn fixed(delta_time: f32, frame: u64) -> Self {
        Self {
            delta_time,
            total_time: delta_time * frame as f32,
            frame,
        }
    }
}
