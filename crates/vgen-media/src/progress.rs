//! Render progress reported by FFmpeg.

use serde::{Deserialize, Serialize};

/// Snapshot taken at each `progress=` marker of FFmpeg's `-progress` stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    pub frame: u64,
    /// Output position in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed relative to realtime
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    pub fn out_time_secs(&self) -> f64 {
        self.out_time_ms as f64 / 1000.0
    }

    /// Fraction of `total_secs` rendered so far, in `[0, 1]`.
    pub fn fraction(&self, total_secs: f64) -> f64 {
        if self.is_complete {
            return 1.0;
        }
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_secs() / total_secs).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };
        assert!((progress.fraction(10.0) - 0.5).abs() < 1e-9);
        assert_eq!(progress.fraction(2.0), 1.0);
        assert_eq!(progress.fraction(0.0), 0.0);
    }

    #[test]
    fn test_complete_is_full() {
        let progress = FfmpegProgress {
            is_complete: true,
            ..Default::default()
        };
        assert_eq!(progress.fraction(60.0), 1.0);
    }
}
