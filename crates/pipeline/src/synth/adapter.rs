//! Synthesis adapter
//!
//! `SegmentRenderer` maps one segment to one decoded WAV artifact at a
//! slot path: silence is generated locally, speech is streamed from the
//! backend, filtered to audio chunks, and trimmed.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;

use autopod_config::TrimConfig;
use autopod_core::Segment;

use super::{SpeechRequest, SynthesisError, TtsBackend, TtsChunk};
use crate::audio::{self, trim};

/// Convert a speed/volume ratio to the backend's signed percent form.
///
/// 1.1 maps to "+10%", 0.9 maps to "-10%". Rounding is half away from
/// zero. Callers validate positivity before conversion.
pub fn ratio_to_percent(ratio: f64) -> String {
    let delta = (ratio - 1.0) * 100.0;
    if delta >= 0.0 {
        format!("+{}%", delta.round() as i64)
    } else {
        format!("-{}%", (-delta).round() as i64)
    }
}

/// Renders one segment into a WAV artifact.
pub struct SegmentRenderer {
    backend: Arc<dyn TtsBackend>,
    trim: TrimConfig,
    sample_rate: u32,
}

impl SegmentRenderer {
    pub fn new(backend: Arc<dyn TtsBackend>, trim: TrimConfig, sample_rate: u32) -> Self {
        Self {
            backend,
            trim,
            sample_rate,
        }
    }

    /// Synthesize `segment` into a WAV file at `path`.
    ///
    /// Backend failures propagate unmodified; there is no retry at this
    /// layer.
    pub async fn render(&self, path: &Path, segment: &Segment) -> Result<(), SynthesisError> {
        match segment {
            Segment::Speech {
                text,
                voice,
                rate,
                volume,
            } => self.render_speech(path, text, voice, *rate, *volume).await,
            Segment::Silence { duration } => self.render_silence(path, *duration),
            Segment::Unknown => {
                tracing::warn!(path = %path.display(), "skipping unrecognized segment kind");
                Ok(())
            }
        }
    }

    /// Write a silent clip of `duration` seconds. Zero is legal and
    /// produces a header-only file.
    fn render_silence(&self, path: &Path, duration: f64) -> Result<(), SynthesisError> {
        let count = (duration * self.sample_rate as f64).round() as usize;
        let samples = vec![0i16; count];
        audio::write_wav(path, &samples, self.sample_rate)?;
        Ok(())
    }

    async fn render_speech(
        &self,
        path: &Path,
        text: &str,
        voice: &str,
        rate: f64,
        volume: f64,
    ) -> Result<(), SynthesisError> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice: voice.to_string(),
            rate: ratio_to_percent(rate),
            volume: ratio_to_percent(volume),
        };

        let mut stream = self.backend.stream(request).await?;
        let mut pcm = Vec::new();
        while let Some(chunk) = stream.next().await {
            match chunk? {
                TtsChunk::Audio(data) => pcm.extend_from_slice(&data),
                TtsChunk::Metadata(meta) => {
                    tracing::trace!(len = meta.len(), "discarding non-audio chunk");
                }
            }
        }

        let samples = audio::pcm_to_samples(&pcm);
        let trimmed = trim::trim_silence(&samples, self.sample_rate, &self.trim);
        tracing::debug!(
            path = %path.display(),
            received = samples.len(),
            kept = trimmed.len(),
            "speech rendered"
        );
        audio::write_wav(path, trimmed, self.sample_rate)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodified_ratio_is_plus_zero() {
        assert_eq!(ratio_to_percent(1.0), "+0%");
    }

    #[test]
    fn test_ratio_above_one() {
        assert_eq!(ratio_to_percent(1.1), "+10%");
        assert_eq!(ratio_to_percent(1.25), "+25%");
        assert_eq!(ratio_to_percent(2.0), "+100%");
    }

    #[test]
    fn test_ratio_below_one() {
        assert_eq!(ratio_to_percent(0.9), "-10%");
        assert_eq!(ratio_to_percent(0.5), "-50%");
        assert_eq!(ratio_to_percent(0.7), "-30%");
    }

    #[test]
    fn test_boundary_ratios_round_away_from_zero() {
        assert_eq!(ratio_to_percent(1.005), "+1%");
        assert_eq!(ratio_to_percent(0.995), "-1%");
    }

    #[test]
    fn test_conversion_is_deterministic() {
        for _ in 0..100 {
            assert_eq!(ratio_to_percent(1.337), ratio_to_percent(1.337));
        }
    }
}
