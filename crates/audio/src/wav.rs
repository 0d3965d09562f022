//! RIFF/WAVE container conversion for utterance hand-off.
//!
//! The understanding workflow receives the drained utterance as a
//! mono, 16-bit, 16 kHz WAV body; the synthesizer returns one, whose
//! exact duration (frames / sample rate) times the playback wait.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{AudioError, Result, SAMPLE_RATE};

fn container_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Wrap raw 16-bit little-endian mono PCM in a WAV container.
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>> {
    if pcm.len() % 2 != 0 {
        return Err(AudioError::TruncatedSample(pcm.len()));
    }

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, container_spec())?;
    {
        let mut samples = writer.get_i16_writer((pcm.len() / 2) as u32);
        for pair in pcm.chunks_exact(2) {
            samples.write_sample(i16::from_le_bytes([pair[0], pair[1]]));
        }
        samples.flush()?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

/// Read the PCM payload back out of a WAV container as raw bytes.
pub fn wav_payload(wav: &[u8]) -> Result<Vec<u8>> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        pcm.extend_from_slice(&sample?.to_le_bytes());
    }
    Ok(pcm)
}

/// The container's declared format.
pub fn wav_spec(wav: &[u8]) -> Result<WavSpec> {
    Ok(WavReader::new(Cursor::new(wav))?.spec())
}

/// Exact audio duration in seconds: frame count divided by sample rate.
pub fn wav_duration_secs(wav: &[u8]) -> Result<f32> {
    let reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();
    Ok(reader.duration() as f32 / spec.sample_rate as f32)
}
