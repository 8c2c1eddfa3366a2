//! Simulated sensor signals
//!
//! There is no device behind the dashboard. Traces are fed from a fixed sine
//! model, and the demo export uses a second, slower one.

/// Time advanced per display tick
pub const TIME_STEP: f64 = 0.1;

/// Live trace value for `channel` at time `t`
pub fn live_sample(t: f64, channel: usize) -> f64 {
    let c = channel as f64;
    (t * (0.25 + c * 0.06)).sin() + c * 0.2
}

/// Demo export value for `channel` at time `t`
pub fn demo_sample(t: f64, channel: usize) -> f64 {
    let c = channel as f64;
    (t * 0.5 + c * 0.3).sin() + c * 0.1
}

/// Running clock of the simulated signal
#[derive(Debug, Clone, Default)]
pub struct SineWaveform {
    t: f64,
}

impl SineWaveform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Advance by one step and return the new time
    pub fn advance(&mut self) -> f64 {
        self.t += TIME_STEP;
        self.t
    }

    /// Values for `channels` channels at the current time
    pub fn frame(&self, channels: usize) -> Vec<f64> {
        (0..channels).map(|c| live_sample(self.t, c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_offsets() {
        assert_eq!(live_sample(0.0, 0), 0.0);
        assert!((live_sample(0.0, 3) - 0.6).abs() < 1e-12);
        assert!((demo_sample(0.0, 2) - (0.6f64.sin() + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_advance() {
        let mut wave = SineWaveform::new();
        wave.advance();
        let t = wave.advance();
        assert!((t - 0.2).abs() < 1e-12);
        assert!((wave.frame(8)[1] - (0.2f64 * 0.31).sin() - 0.2).abs() < 1e-12);
    }
}
