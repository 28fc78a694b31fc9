#![allow(dead_code)]

use std::f64::consts::PI;
use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Encode interleaved 16-bit samples as a WAV container
pub fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("create WAV writer");
        for &sample in samples {
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize WAV");
    }
    cursor.into_inner()
}

/// Mono sine of `seconds` length
pub fn sine_wav(frequency: f64, sample_rate: u32, seconds: f64, amplitude: f64) -> Vec<u8> {
    let len = (sample_rate as f64 * seconds) as usize;
    let samples: Vec<i16> = (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (amplitude * (2.0 * PI * frequency * t).sin()) as i16
        })
        .collect();
    wav_bytes(1, sample_rate, &samples)
}

/// Mono melody stepping through `notes`, each held for `note_seconds`
pub fn melody_wav(notes: &[f64], sample_rate: u32, note_seconds: f64, amplitude: f64) -> Vec<u8> {
    let note_len = (sample_rate as f64 * note_seconds) as usize;
    let samples: Vec<i16> = notes
        .iter()
        .flat_map(|&frequency| {
            (0..note_len).map(move |i| {
                let t = i as f64 / sample_rate as f64;
                (amplitude * (2.0 * PI * frequency * t).sin()) as i16
            })
        })
        .collect();
    wav_bytes(1, sample_rate, &samples)
}

pub fn silent_wav(channels: u16, sample_rate: u32, seconds: f64) -> Vec<u8> {
    let len = (sample_rate as f64 * seconds) as usize * channels as usize;
    wav_bytes(channels, sample_rate, &vec![0; len])
}
