//! WAV artifact helpers shared by the synthesis adapter

pub mod trim;

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Write mono 16-bit PCM samples as a WAV file.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Read a mono 16-bit WAV file back into samples.
pub fn read_wav(path: &Path) -> Result<(Vec<i16>, u32), hound::Error> {
    let mut reader = WavReader::open(path)?;
    let sample_rate = reader.spec().sample_rate;
    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    Ok((samples, sample_rate))
}

/// Reinterpret little-endian 16-bit PCM bytes as samples.
///
/// A trailing odd byte (a network chunk split mid-sample) is dropped.
pub fn pcm_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_to_samples_drops_trailing_byte() {
        let samples = pcm_to_samples(&[0x01, 0x00, 0xff, 0x7f, 0x42]);
        assert_eq!(samples, vec![1, i16::MAX]);
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let samples: Vec<i16> = (0..480).map(|i| (i % 100) as i16).collect();

        write_wav(&path, &samples, 24_000).unwrap();
        let (back, sample_rate) = read_wav(&path).unwrap();

        assert_eq!(sample_rate, 24_000);
        assert_eq!(back, samples);
    }

    #[test]
    fn test_empty_wav_is_legal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, &[], 24_000).unwrap();
        let (back, _) = read_wav(&path).unwrap();
        assert!(back.is_empty());
    }
}
