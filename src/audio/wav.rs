//! WAV payload assembly for the transcription upload.
//!
//! The remote API accepts a single `audio.wav` file, so the buffered f32
//! chunks are downmixed to mono and encoded as 16-bit PCM via `hound`.

use std::io::Cursor;

// ---------------------------------------------------------------------------
// interleaved_to_mono
// ---------------------------------------------------------------------------

/// Downmix interleaved multi-channel samples to mono by averaging each frame.
///
/// A `channels` of 0 or 1 returns the input unchanged.
pub fn interleaved_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

// ---------------------------------------------------------------------------
// encode_wav
// ---------------------------------------------------------------------------

/// Encode mono f32 samples in `[-1.0, 1.0]` as a 16-bit PCM WAV byte buffer.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(scaled)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(interleaved_to_mono(&samples, 1), samples);
    }

    #[test]
    fn stereo_downmix_averages_frames() {
        let samples = vec![0.5, 0.5, 1.0, 0.0];
        assert_eq!(interleaved_to_mono(&samples, 2), vec![0.5, 0.5]);
    }

    #[test]
    fn encoded_wav_round_trips_through_hound() {
        let samples = vec![0.0_f32; 160];
        let bytes = encode_wav(&samples, 16_000).expect("encode");

        // RIFF/WAVE header sanity.
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).expect("read");
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 160);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let bytes = encode_wav(&[2.0, -2.0], 16_000).expect("encode");
        let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).expect("read");
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
    }
}
