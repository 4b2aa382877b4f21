//! Progress reporting seam between the benchmarks and the terminal
//!
//! Benchmarks only report positions; rendering lives in `crate::output`.

/// Receives position updates from long-running benchmark loops
pub trait Progress {
    /// A new phase begins; `len` is the expected final position
    fn start(&mut self, label: &str, len: u64);

    /// Current position within the phase
    fn set_position(&mut self, pos: u64);

    /// The phase has completed
    fn finish(&mut self);
}

/// Discards all progress updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _label: &str, _len: u64) {}

    fn set_position(&mut self, _pos: u64) {}

    fn finish(&mut self) {}
}

/// Records every phase it sees, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub phases: Vec<PhaseRecord>,
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct PhaseRecord {
    pub label: String,
    pub len: u64,
    pub last_position: u64,
    pub updates: u64,
    pub finished: bool,
}

#[cfg(test)]
impl Progress for RecordingProgress {
    fn start(&mut self, label: &str, len: u64) {
        self.phases.push(PhaseRecord {
            label: label.to_string(),
            len,
            ..Default::default()
        });
    }

    fn set_position(&mut self, pos: u64) {
        if let Some(phase) = self.phases.last_mut() {
            phase.last_position = pos;
            phase.updates += 1;
        }
    }

    fn finish(&mut self) {
        if let Some(phase) = self.phases.last_mut() {
            phase.finished = true;
        }
    }
}
