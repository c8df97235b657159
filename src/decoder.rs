use tracing::{debug, trace, warn};

use crate::adpcm_ima::{ChannelState, MAX_STEP_INDEX};
use crate::block::{self, HEADER_BYTES_PER_CHANNEL, SAMPLES_PER_CHUNK};
use crate::config::DecoderConfig;
use crate::Error;

/// Decodes IMA ADPCM blocks to interleaved 16-bit samples.
///
/// Every block carries its own initial state in its header, so the decoder keeps no state
/// between blocks: blocks can be decoded in any order or in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder for streams described by `config`.
    pub fn new(config: DecoderConfig) -> Decoder {
        debug!(channels = config.channels(), sample_rate = config.sample_rate(),
            block_size = config.block_size(), "created ADPCM decoder");
        Decoder { config }
    }

    /// The configuration this decoder was created with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a single block. See [`decode_block()`].
    pub fn decode_block(&self, block: &[u8], out_samples: &mut [i16]) -> Result<usize, Error> {
        decode_block(block, self.config.channels(), out_samples)
    }

    /// Decodes a stream of consecutive blocks from `input` to `out_samples` and returns the
    /// number of samples written.
    ///
    /// Decoding stops when `out_samples` is full or `input` is exhausted. The stream is
    /// expected to hold `out_samples.len() / channels` frames: full blocks of
    /// [`DecoderConfig::block_size()`] bytes followed by a shorter final block, sized the
    /// way the encoder sizes it.
    ///
    /// An error is returned if a block header is malformed or if `input` ends in the
    /// middle of a block.
    pub fn decode(&self, input: &[u8], out_samples: &mut [i16]) -> Result<usize, Error> {
        let channels = self.config.channels();
        let mut block_samples = vec![0; self.config.samples_per_block() * channels];
        let mut frames_left = out_samples.len() / channels;
        let mut read = 0;
        let mut written = 0;

        while read < input.len() && frames_left > 0 {
            let (adpcm_samples, block_size) = block::next_block(frames_left, channels,
                self.config.samples_per_block(), self.config.block_size());
            let available = input.len() - read;
            if available < block_size {
                return Err(Error::TruncatedInput { expected: block_size, found: available });
            }

            let decoded = self.decode_block(&input[read..read + block_size],
                &mut block_samples)?;
            trace!(offset = read, bytes = block_size, samples = adpcm_samples,
                "decoded ADPCM block");

            // the final block may hold padding samples past the end of the stream
            let count = decoded.min(frames_left * channels);
            out_samples[written..written + count].copy_from_slice(&block_samples[..count]);
            written += count;
            frames_left -= count / channels;
            read += block_size;
        }
        Ok(written)
    }

    /// Decodes a stream of `frames` samples per channel to a new vector.
    pub fn decode_to_vec(&self, input: &[u8], frames: usize) -> Result<Vec<i16>, Error> {
        let mut out_samples = vec![0; frames * self.config.channels()];
        let written = self.decode(input, &mut out_samples)?;
        out_samples.truncate(written);
        Ok(out_samples)
    }
}

/// Decodes one IMA ADPCM block to interleaved 16-bit samples.
///
/// `block` should contain a 4 byte header per channel (initial sample as little-endian i16,
/// step index, zero byte) followed by chunks of 4 bytes per channel, each byte holding two
/// 4-bit codes (the earlier sample in the low nibble). Bytes after the last complete chunk
/// are ignored. `channels` must be 1 or 2.
///
/// This function outputs `channels * (1 + 8 * chunks)` samples to `out_samples` and returns
/// that count. Samples are interleaved for 2 channel audio.
///
/// An error is returned if `block` is shorter than its header, if a header has a step
/// index above 88 or a nonzero reserved byte, or if `out_samples` is too short.
/// If an error is returned, the contents of `out_samples` are unspecified.
pub fn decode_block(block: &[u8], channels: usize, out_samples: &mut [i16])
    -> Result<usize, Error> {

    if channels != 1 && channels != 2 {
        return Err(Error::InvalidBufferSize);
    }
    let header_size = channels * HEADER_BYTES_PER_CHANNEL;
    if block.len() < header_size {
        return Err(Error::TruncatedInput { expected: header_size, found: block.len() });
    }
    let (header, payload) = block.split_at(header_size);
    // a chunk holds 8 samples for each channel
    let chunk_size = header_size;
    let sample_count = channels * (1 + payload.len() / chunk_size * SAMPLES_PER_CHUNK);
    if out_samples.len() < sample_count {
        return Err(Error::InvalidBufferSize);
    }

    let mut states = [ChannelState::default(); 2];
    for (ch, header) in header.chunks_exact(HEADER_BYTES_PER_CHANNEL).enumerate() {
        let sample = i16::from_le_bytes([header[0], header[1]]);
        let step_index = header[2];
        let reserved = header[3];
        if step_index > MAX_STEP_INDEX || reserved != 0 {
            warn!(channel = ch, step_index, reserved, "malformed ADPCM block header");
            return Err(Error::MalformedBlockHeader { channel: ch, step_index, reserved });
        }
        states[ch] = ChannelState::new(sample, step_index);
        out_samples[ch] = sample;
    }

    for (chunk, bytes) in payload.chunks_exact(chunk_size).enumerate() {
        for (ch, bytes) in bytes.chunks_exact(4).enumerate() {
            let state = &mut states[ch];
            for (pair, b) in bytes.iter().enumerate() {
                let frame = 1 + chunk * SAMPLES_PER_CHUNK + 2 * pair;
                out_samples[frame * channels + ch] = state.apply_nibble(b & 0x0f);
                out_samples[(frame + 1) * channels + ch] = state.apply_nibble(b >> 4);
            }
        }
    }
    Ok(sample_count)
}
