//! Block size arithmetic shared by the encoder, the decoder and container writers.
//!
//! A block starts with a 4 byte header per channel and continues with 4-bit codes. The
//! `channels ^ 3` factor below is 2 for mono (two codes per byte of one channel) and 1 for
//! stereo (two codes per byte, alternating channels every 4 bytes).

/// Size of the per-channel block header in bytes.
pub const HEADER_BYTES_PER_CHANNEL: usize = 4;

/// Number of samples per channel between two channel switches in the block payload.
pub const SAMPLES_PER_CHUNK: usize = 8;

/// Smallest accepted explicit block size.
pub const MIN_BLOCK_SIZE: usize = 256;

/// Largest accepted explicit block size.
pub const MAX_BLOCK_SIZE: usize = 32768;

/// Number of samples per channel encoded in a block of `block_size` bytes.
///
/// A block too small for its headers holds only the header samples, so 1 is returned.
pub fn samples_per_block(channels: usize, block_size: usize) -> usize {
    block_size.saturating_sub(channels * HEADER_BYTES_PER_CHANNEL) * (channels ^ 3) + 1
}

/// Block size used when none is configured: 256 bytes per channel for every whole
/// 11000 Hz of sample rate, and at least 256 bytes per channel.
pub fn default_block_size(channels: usize, sample_rate: u32) -> usize {
    let multiplier = usize::try_from(sample_rate / 11000).unwrap_or(usize::MAX).max(1);
    256 * channels * multiplier
}

/// Average number of encoded bytes per second of audio.
pub fn bytes_per_second(sample_rate: u32, block_size: usize, samples_per_block: usize) -> u32 {
    let bytes = u64::from(sample_rate) * block_size as u64 / samples_per_block.max(1) as u64;
    u32::try_from(bytes).unwrap_or(u32::MAX)
}

/// Number of samples per channel encoded in the final, short block of a stream that has
/// `frames` samples per channel left. The count is rounded up to the next multiple of 8,
/// plus the header sample.
pub fn tail_block_samples(frames: usize) -> usize {
    ((frames + 6) & !7) + 1
}

/// Size in bytes of a block that encodes `adpcm_samples` samples per channel.
///
/// Every block has its headers, so 0 samples need as many bytes as 1.
pub fn block_size_for_samples(channels: usize, adpcm_samples: usize) -> usize {
    adpcm_samples.saturating_sub(1) / (channels ^ 3) + channels * HEADER_BYTES_PER_CHANNEL
}

/// Total number of encoded bytes for a stream of `frames` samples per channel.
pub fn output_size(frames: usize, channels: usize, samples_per_block: usize,
    block_size: usize) -> usize {

    let full_blocks = frames / samples_per_block;
    let remaining = frames % samples_per_block;
    let mut size = full_blocks * block_size;
    if remaining != 0 {
        size += block_size_for_samples(channels, tail_block_samples(remaining));
    }
    size
}

/// Number of samples per channel and the byte size of the next block of a stream that has
/// `frames` samples per channel left.
pub(crate) fn next_block(frames: usize, channels: usize, samples_per_block: usize,
    block_size: usize) -> (usize, usize) {

    if frames >= samples_per_block {
        (samples_per_block, block_size)
    } else {
        let adpcm_samples = tail_block_samples(frames);
        (adpcm_samples, block_size_for_samples(channels, adpcm_samples))
    }
}
