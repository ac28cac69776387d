//! Exploration schedule

/// Linear interpolation of ε from `start` on the first episode to `end` on
/// the last one
///
/// `start == end` gives a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonSchedule {
    pub start: f64,
    pub end: f64,
}

impl EpsilonSchedule {
    pub fn linear(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// ε for episode `episode` (0-based) of a run of `total` episodes
    ///
    /// The final episode gets exactly `end`, and so does a one-episode run.
    /// Indices past the end stay at `end`.
    pub fn epsilon_at(&self, episode: usize, total: usize) -> f64 {
        if total <= 1 || episode + 1 >= total {
            return self.end;
        }
        let fraction = episode as f64 / (total - 1) as f64;
        self.start + (self.end - self.start) * fraction
    }
}
