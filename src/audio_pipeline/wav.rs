//! RIFF/WAVE validation and decoding
//!
//! The chunk list is walked directly to find the declared format tag and `data`
//! length; `hound` then decodes the samples. The frame count derived from the
//! declared length is cross-checked against the decoder before any sample is read.
use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use serde::Serialize;
use tracing::debug;

use super::buffer::{PcmBuffer, PcmFormat};
use super::error::{DecodeError, ValidationError};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Properties of the uploaded container, derived once per input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub original_format: String,
    pub original_channels: u16,
    pub original_sample_rate: u32,
    pub original_bits_per_sample: u16,
    /// Seconds, `total_frames / sample_rate`
    pub duration: f64,
    pub file_size_bytes: u64,
    pub total_frames: u64,
}

#[derive(Debug)]
pub struct DecodedWav {
    pub metadata: AudioMetadata,
    pub buffer: PcmBuffer,
}

/// Reject empty or oversized input before parsing
pub fn validate_input(bytes: &[u8], max_bytes: usize) -> Result<(), ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(ValidationError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Parse the container header and derive its metadata without decoding samples
pub fn read_metadata(bytes: &[u8]) -> Result<AudioMetadata, DecodeError> {
    let (metadata, _) = open(bytes)?;
    Ok(metadata)
}

/// Parse the container and decode every sample
pub fn decode(bytes: &[u8]) -> Result<DecodedWav, DecodeError> {
    let (metadata, mut reader) = open(bytes)?;

    let format = PcmFormat {
        channels: metadata.original_channels,
        sample_rate: metadata.original_sample_rate,
        bits_per_sample: metadata.original_bits_per_sample,
    };
    let mut samples = Vec::with_capacity(reader.len() as usize);
    for (index, sample) in reader.samples::<i32>().enumerate() {
        samples.push(sample.map_err(|source| DecodeError::Samples { index, source })?);
    }

    let buffer = PcmBuffer::new(format, samples).map_err(|err| DecodeError::InvalidFormat {
        message: err.to_string(),
    })?;

    debug!(
        channels = format.channels,
        sample_rate = format.sample_rate,
        bits = format.bits_per_sample,
        frames = buffer.frame_count(),
        "decoded WAV container"
    );

    Ok(DecodedWav { metadata, buffer })
}

fn open(bytes: &[u8]) -> Result<(AudioMetadata, WavReader<Cursor<&[u8]>>), DecodeError> {
    let chunks = scan_chunks(bytes)?;
    match chunks.format_tag {
        WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE => {}
        other => {
            return Err(DecodeError::UnsupportedEncoding {
                format: format_tag_name(other),
            })
        }
    }

    let available = bytes.len() - chunks.data_offset;
    if chunks.data_len > available {
        return Err(DecodeError::Truncated {
            declared: chunks.data_len,
            available,
        });
    }

    let reader = WavReader::new(Cursor::new(bytes)).map_err(DecodeError::Header)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(DecodeError::UnsupportedEncoding {
            format: "IEEE float".to_string(),
        });
    }
    if spec.channels == 0 || spec.sample_rate == 0 || spec.bits_per_sample == 0 {
        return Err(DecodeError::InvalidFormat {
            message: format!(
                "channels={} sample_rate={} bits={}",
                spec.channels, spec.sample_rate, spec.bits_per_sample
            ),
        });
    }

    // container width, which can exceed the valid bits hound reports
    let total_frames = chunks.data_len as u64 / chunks.block_align as u64;
    let decoded_frames = reader.duration() as u64;
    if total_frames != decoded_frames {
        return Err(DecodeError::FrameCountMismatch {
            declared: total_frames,
            decoded: decoded_frames,
        });
    }

    let metadata = AudioMetadata {
        original_format: "WAV".to_string(),
        original_channels: spec.channels,
        original_sample_rate: spec.sample_rate,
        original_bits_per_sample: spec.bits_per_sample,
        duration: total_frames as f64 / spec.sample_rate as f64,
        file_size_bytes: bytes.len() as u64,
        total_frames,
    };
    Ok((metadata, reader))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RiffChunks {
    format_tag: u16,
    /// Bytes per sample frame as declared in `fmt `
    block_align: u16,
    data_offset: usize,
    data_len: usize,
}

/// Walk the RIFF chunk list for the `fmt ` tag and the `data` chunk bounds
fn scan_chunks(bytes: &[u8]) -> Result<RiffChunks, DecodeError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(DecodeError::InvalidFormat {
            message: "missing RIFF/WAVE header".to_string(),
        });
    }

    let mut format = None;
    let mut position = 12;
    while position + 8 <= bytes.len() {
        let id = &bytes[position..position + 4];
        let size = u32::from_le_bytes([
            bytes[position + 4],
            bytes[position + 5],
            bytes[position + 6],
            bytes[position + 7],
        ]) as usize;
        let body = position + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(DecodeError::InvalidFormat {
                        message: "fmt chunk is too short".to_string(),
                    });
                }
                let format_tag = u16::from_le_bytes([bytes[body], bytes[body + 1]]);
                let block_align = u16::from_le_bytes([bytes[body + 12], bytes[body + 13]]);
                if block_align == 0 {
                    return Err(DecodeError::InvalidFormat {
                        message: "block align is zero".to_string(),
                    });
                }
                format = Some((format_tag, block_align));
            }
            b"data" => {
                let (format_tag, block_align) =
                    format.ok_or_else(|| DecodeError::InvalidFormat {
                        message: "data chunk precedes fmt chunk".to_string(),
                    })?;
                return Ok(RiffChunks {
                    format_tag,
                    block_align,
                    data_offset: body,
                    data_len: size,
                });
            }
            _ => {}
        }

        // chunks are word aligned
        position = body.saturating_add(size).saturating_add(size & 1);
    }

    match format {
        Some(_) => Err(DecodeError::MissingDataChunk),
        None => Err(DecodeError::InvalidFormat {
            message: "missing fmt chunk".to_string(),
        }),
    }
}

fn format_tag_name(tag: u16) -> String {
    match tag {
        WAVE_FORMAT_IEEE_FLOAT => "IEEE float".to_string(),
        0x0002 => "Microsoft ADPCM".to_string(),
        0x0006 => "A-law".to_string(),
        0x0007 => "mu-law".to_string(),
        0x0055 => "MPEG layer 3".to_string(),
        other => format!("format tag {other:#06x}"),
    }
}
