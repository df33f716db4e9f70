//! Leading/trailing silence removal
//!
//! Synthesized speech usually arrives padded with near-silence on both
//! ends. Two independent sliding-window scans walk inward from each end
//! and stop at the first window whose loudness clears the threshold.

use autopod_config::TrimConfig;

/// RMS loudness of a window in dBFS relative to i16 full scale.
///
/// An empty or all-zero window is -inf, which always reads as silence.
fn window_dbfs(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let s = s as f64;
            s * s
        })
        .sum();
    let rms = (sum_squares / samples.len() as f64).sqrt();
    if rms <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * (rms / i16::MAX as f64).log10()
}

fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    ms as usize * sample_rate as usize / 1000
}

/// Strip near-silent spans from both ends of a clip.
///
/// Each scan advances in `step_ms` strides, measuring a `window_ms`
/// window, while the window stays below `threshold_dbfs`. Neither scan
/// moves past the midpoint, so a fully silent clip collapses to (near)
/// nothing rather than underflowing, and empty input is returned as is.
pub fn trim_silence<'a>(samples: &'a [i16], sample_rate: u32, config: &TrimConfig) -> &'a [i16] {
    if samples.is_empty() {
        return samples;
    }

    let window = ms_to_samples(config.window_ms, sample_rate).max(1);
    let step = ms_to_samples(config.step_ms, sample_rate).max(1);
    let mid = samples.len() / 2;

    let mut start = 0usize;
    while start < mid {
        let end = (start + window).min(samples.len());
        if window_dbfs(&samples[start..end]) >= config.threshold_dbfs {
            break;
        }
        start += step;
    }
    let start = start.min(mid);

    let mut stop = samples.len();
    while stop > mid {
        let begin = stop.saturating_sub(window);
        if window_dbfs(&samples[begin..stop]) >= config.threshold_dbfs {
            break;
        }
        stop = stop.saturating_sub(step);
    }
    let stop = stop.max(mid);

    &samples[start..stop]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 24_000;

    fn config() -> TrimConfig {
        TrimConfig::default()
    }

    /// 1s of silence, half a second of tone, 1s of silence.
    fn padded_clip() -> Vec<i16> {
        let mut samples = vec![0i16; 24_000];
        samples.extend(std::iter::repeat(8_000i16).take(12_000));
        samples.extend(std::iter::repeat(0i16).take(24_000));
        samples
    }

    #[test]
    fn test_empty_input_does_not_panic() {
        let trimmed = trim_silence(&[], SAMPLE_RATE, &config());
        assert!(trimmed.is_empty());
    }

    #[test]
    fn test_loud_clip_is_untouched() {
        let samples = vec![8_000i16; 24_000];
        let trimmed = trim_silence(&samples, SAMPLE_RATE, &config());
        assert_eq!(trimmed.len(), samples.len());
    }

    #[test]
    fn test_symmetric_trim() {
        let samples = padded_clip();
        let trimmed = trim_silence(&samples, SAMPLE_RATE, &config());

        // The tone must survive in full; the padding must mostly go. The
        // scan stops within one window of the tone on either side.
        let window = 50 * SAMPLE_RATE as usize / 1000;
        assert!(trimmed.len() >= 12_000);
        assert!(trimmed.len() <= 12_000 + 2 * window + 2 * (20 * SAMPLE_RATE as usize / 1000));
        assert!(trimmed.iter().any(|&s| s == 8_000));
    }

    #[test]
    fn test_all_silence_collapses_without_underflow() {
        let samples = vec![0i16; 24_000];
        let trimmed = trim_silence(&samples, SAMPLE_RATE, &config());
        // Both scans stop at the midpoint; nothing is left but no panic
        // and no wrap-around either.
        assert!(trimmed.len() <= samples.len());
        assert!(trimmed.is_empty());
    }

    #[test]
    fn test_never_trims_past_midpoint() {
        // Quiet clip just above a very aggressive threshold would trim
        // everything if the scans were unbounded.
        let samples = vec![10i16; 24_000];
        let mut config = config();
        config.threshold_dbfs = 0.0;
        let trimmed = trim_silence(&samples, SAMPLE_RATE, &config);
        assert!(trimmed.is_empty());
    }

    #[test]
    fn test_clip_shorter_than_window() {
        let samples = vec![8_000i16; 100];
        let trimmed = trim_silence(&samples, SAMPLE_RATE, &config());
        assert_eq!(trimmed.len(), samples.len());
    }
}
