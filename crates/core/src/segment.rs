//! The segment model
//!
//! A segment is one unit of narration: either a line of speech with its
//! synthesis parameters, or a pause. Content providers produce a stream of
//! these; the build pipeline consumes them in order.

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// One unit of narration content.
///
/// `rate` and `volume` are multiplicative ratios relative to the backend's
/// default delivery (1.0 = unmodified). Both must be strictly positive;
/// `Segment::validate` enforces the contract before any synthesis work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// A spoken line.
    Speech {
        text: String,
        /// Backend voice identifier, e.g. "en-GB-SoniaNeural".
        voice: String,
        #[serde(default = "default_ratio")]
        rate: f64,
        #[serde(default = "default_ratio")]
        volume: f64,
    },
    /// A pause of the given length in seconds.
    Silence { duration: f64 },
    /// An upstream unit whose kind this build does not recognize.
    ///
    /// Annotation data can name kinds newer than this binary; they land
    /// here instead of failing deserialization, and every dispatch site is
    /// forced to handle them (log and skip, never crash).
    #[serde(other)]
    Unknown,
}

fn default_ratio() -> f64 {
    1.0
}

impl Segment {
    /// Speech segment with unmodified rate and volume.
    pub fn speech(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Segment::Speech {
            text: text.into(),
            voice: voice.into(),
            rate: 1.0,
            volume: 1.0,
        }
    }

    /// Speech segment with explicit rate and volume ratios.
    pub fn speech_with_params(
        text: impl Into<String>,
        voice: impl Into<String>,
        rate: f64,
        volume: f64,
    ) -> Self {
        Segment::Speech {
            text: text.into(),
            voice: voice.into(),
            rate,
            volume,
        }
    }

    /// Silence segment of `duration` seconds.
    pub fn silence(duration: f64) -> Self {
        Segment::Silence { duration }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Speech { .. } => "speech",
            Segment::Silence { .. } => "silence",
            Segment::Unknown => "unknown",
        }
    }

    /// Check the parameter contract.
    ///
    /// Zero or negative rate/volume is a caller error, not something to
    /// clamp silently.
    pub fn validate(&self) -> Result<(), SegmentError> {
        match self {
            Segment::Speech {
                text,
                voice,
                rate,
                volume,
            } => {
                if text.trim().is_empty() {
                    return Err(SegmentError::EmptyText);
                }
                if voice.trim().is_empty() {
                    return Err(SegmentError::EmptyVoice);
                }
                if !(rate.is_finite() && *rate > 0.0) {
                    return Err(SegmentError::InvalidRate(*rate));
                }
                if !(volume.is_finite() && *volume > 0.0) {
                    return Err(SegmentError::InvalidVolume(*volume));
                }
                Ok(())
            }
            Segment::Silence { duration } => {
                if !(duration.is_finite() && *duration >= 0.0) {
                    return Err(SegmentError::InvalidDuration(*duration));
                }
                Ok(())
            }
            Segment::Unknown => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_defaults() {
        let segment = Segment::speech("Hello world!", "en-GB-SoniaNeural");
        match segment {
            Segment::Speech { rate, volume, .. } => {
                assert_eq!(rate, 1.0);
                assert_eq!(volume, 1.0);
            }
            other => panic!("expected speech, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_valid_segments() {
        assert!(Segment::speech("hi", "en-GB-SoniaNeural").validate().is_ok());
        assert!(Segment::speech_with_params("hi", "voice", 0.7, 1.3)
            .validate()
            .is_ok());
        assert!(Segment::silence(0.0).validate().is_ok());
        assert!(Segment::silence(2.5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_ratios() {
        assert_eq!(
            Segment::speech_with_params("hi", "voice", 0.0, 1.0).validate(),
            Err(SegmentError::InvalidRate(0.0))
        );
        assert_eq!(
            Segment::speech_with_params("hi", "voice", 1.0, -0.5).validate(),
            Err(SegmentError::InvalidVolume(-0.5))
        );
        assert!(matches!(
            Segment::speech_with_params("hi", "voice", f64::NAN, 1.0).validate(),
            Err(SegmentError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_text_and_negative_duration() {
        assert_eq!(
            Segment::speech("   ", "voice").validate(),
            Err(SegmentError::EmptyText)
        );
        assert_eq!(
            Segment::silence(-1.0).validate(),
            Err(SegmentError::InvalidDuration(-1.0))
        );
    }

    #[test]
    fn test_unrecognized_kind_deserializes_to_unknown() {
        let segment: Segment =
            serde_json::from_str(r#"{"kind": "applause", "length": 3}"#).unwrap();
        assert_eq!(segment, Segment::Unknown);
        assert!(segment.validate().is_ok());
    }

    #[test]
    fn test_tagged_round_trip() {
        let segment = Segment::speech_with_params("Goodbye.", "en-GB-SoniaNeural", 0.7, 1.0);
        let json = serde_json::to_string(&segment).unwrap();
        assert!(json.contains(r#""kind":"speech""#));
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
    }
}
