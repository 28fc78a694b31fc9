use super::buffer::PcmBuffer;
use super::error::StageError;

/// Collapse interleaved channels to mono with a truncating integer average
///
/// A buffer that is already mono is returned as is. For wider input each frame's
/// samples are summed as `i64` and divided by the channel count, rounding toward
/// zero: `(-500, -1500)` becomes `-1000`, `(1, 2)` becomes `1`, `(-1, -2)`
/// becomes `-1`.
pub fn interleaved_to_mono(buffer: PcmBuffer) -> Result<PcmBuffer, StageError> {
    let channels = buffer.channels();
    if channels == 1 {
        return Ok(buffer);
    }

    let mut mono = Vec::with_capacity(buffer.frame_count());
    for frame in buffer.frames() {
        let sum: i64 = frame.iter().map(|sample| *sample as i64).sum();
        let average = sum / channels as i64;
        let sample = i32::try_from(average)
            .map_err(|_| StageError::malformed(format!("average {average} overflows i32")))?;
        mono.push(sample);
    }

    PcmBuffer::new(buffer.format().with_channels(1), mono)
}
