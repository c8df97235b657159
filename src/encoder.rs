use tracing::{debug, trace};

use crate::adpcm_ima::ChannelState;
use crate::block::{self, HEADER_BYTES_PER_CHANNEL, SAMPLES_PER_CHUNK};
use crate::config::EncoderConfig;
use crate::context::BlockContext;
use crate::search::{minimum_error, Upcoming, DEFAULT_LOOKAHEAD};
use crate::shaping::NoiseShaping;
use crate::Error;

/// Encodes interleaved 16-bit samples to IMA ADPCM blocks.
///
/// The encoder keeps the quantizer state of every channel from one block to the next, so
/// the blocks of a stream must be encoded in order by the same encoder. The state is
/// seeded from the first block the encoder sees; call [`Encoder::reset()`] to start a new
/// stream.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
    shaping: NoiseShaping,
    lookahead: usize,
    context: Option<BlockContext>,
    // one block of input, padded when the input ends mid-block
    block: Vec<i16>,
    blocks_encoded: u64,
}

impl Encoder {
    /// Creates an encoder for `config`. The noise shaping mode is chosen here.
    pub fn new(config: EncoderConfig) -> Encoder {
        let shaping = NoiseShaping::select(config.noise_shaping(), config.sample_rate());
        debug!(channels = config.channels(), sample_rate = config.sample_rate(),
            block_size = config.block_size(), ?shaping, "created ADPCM encoder");
        let block = vec![0; config.samples_per_block() * config.channels()];
        Encoder {
            config,
            shaping,
            lookahead: DEFAULT_LOOKAHEAD,
            context: None,
            block,
            blocks_encoded: 0,
        }
    }

    /// The configuration this encoder was created with.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The noise shaping mode selected from the configuration.
    pub fn noise_shaping(&self) -> NoiseShaping {
        self.shaping
    }

    /// The running quantizer state, or `None` before the first block has been encoded.
    pub fn context(&self) -> Option<&BlockContext> {
        self.context.as_ref()
    }

    /// Forgets the running quantizer state. The next block is encoded as the start of a
    /// new stream.
    pub fn reset(&mut self) {
        self.context = None;
        self.blocks_encoded = 0;
    }

    /// Encodes interleaved `samples` to `out` and returns the number of bytes written.
    ///
    /// `samples` must contain whole frames (a multiple of the channel count) and `out` must
    /// hold at least [`EncoderConfig::output_size_for()`] bytes. The input is split into
    /// blocks of [`EncoderConfig::samples_per_block()`] frames; a final partial block is
    /// padded by repeating its last frame and written with a smaller size. When a stream is
    /// encoded with several calls, every call but the last must pass whole blocks.
    ///
    /// An error is returned if `samples` or `out` has an invalid length. If an error is
    /// returned, the contents of `out` are unspecified.
    pub fn encode(&mut self, samples: &[i16], out: &mut [u8]) -> Result<usize, Error> {
        let channels = self.config.channels();
        if samples.len() % channels != 0 || out.len() < self.config.output_size_for(samples) {
            return Err(Error::InvalidBufferSize);
        }

        let mut written = 0;
        for input in samples.chunks(self.config.samples_per_block() * channels) {
            let frames = input.len() / channels;
            let (adpcm_samples, block_size) = block::next_block(frames, channels,
                self.config.samples_per_block(), self.config.block_size());

            let block = &mut self.block[..adpcm_samples * channels];
            block[..input.len()].copy_from_slice(input);
            // repeat the last frame so that the lookahead never reads past the input
            for i in input.len()..block.len() {
                block[i] = block[i - channels];
            }
            let block = &*block;

            let context = match self.context.take() {
                Some(context) => context,
                None => BlockContext::new(adpcm_samples, block, channels)?,
            };
            let context = self.context.insert(context);
            encode_block(context, self.shaping, self.lookahead, block,
                &mut out[written..written + block_size])?;

            trace!(block = self.blocks_encoded, bytes = block_size, samples = adpcm_samples,
                "encoded ADPCM block");
            self.blocks_encoded += 1;
            written += block_size;
        }
        Ok(written)
    }

    /// Encodes interleaved `samples` to a new vector.
    pub fn encode_to_vec(&mut self, samples: &[i16]) -> Result<Vec<u8>, Error> {
        let mut out = vec![0; self.config.output_size_for(samples)];
        let written = self.encode(samples, &mut out)?;
        out.truncate(written);
        Ok(out)
    }
}

/// Encodes one block of interleaved `samples` to `out` and returns the number of bytes
/// written.
///
/// `samples` holds `1 + 8 * n` frames. Each channel's reconstructed sample is reset to
/// the block's first frame, which the header carries together with the running step index.
/// The payload then holds, for each 8 frame chunk and each channel, 4 bytes of two codes
/// each (the earlier sample in the low nibble).
///
/// `out` must be exactly as long as the encoded block; otherwise `EncodingSizeMismatch`
/// reports the number of bytes the block needed.
fn encode_block(context: &mut BlockContext, shaping: NoiseShaping, lookahead: usize,
    samples: &[i16], out: &mut [u8]) -> Result<usize, Error> {

    let channels = context.channels();
    let adpcm_samples = samples.len() / channels;
    let chunks = adpcm_samples.saturating_sub(1) / SAMPLES_PER_CHUNK;
    let header_size = channels * HEADER_BYTES_PER_CHANNEL;
    if out.len() < header_size {
        return Err(Error::EncodingSizeMismatch { expected: out.len(), found: header_size });
    }

    let (header, payload) = out.split_at_mut(header_size);
    let states = context.states_mut();
    for (ch, (state, header)) in states.iter_mut()
        .zip(header.chunks_exact_mut(HEADER_BYTES_PER_CHANNEL))
        .enumerate() {

        state.sample = samples[ch];
        header[..2].copy_from_slice(&state.sample.to_le_bytes());
        header[2] = state.step_index;
        header[3] = 0;
    }

    // the lookahead stops at the last frame of the block
    let depth = |frame: usize| (adpcm_samples - frame - 1).min(lookahead);
    let mut bytes = payload.iter_mut();
    let mut produced = header_size;
    for chunk in 0..chunks {
        for (ch, state) in states.iter_mut().enumerate() {
            for pair in 0..4 {
                let frame = 1 + chunk * SAMPLES_PER_CHUNK + 2 * pair;
                let low = encode_sample(state, shaping, Upcoming {
                    samples,
                    position: frame * channels + ch,
                    stride: channels,
                }, depth(frame));
                let high = encode_sample(state, shaping, Upcoming {
                    samples,
                    position: (frame + 1) * channels + ch,
                    stride: channels,
                }, depth(frame + 1));
                if let Some(byte) = bytes.next() {
                    *byte = low | (high << 4);
                }
                produced += 1;
            }
        }
    }
    if produced != out.len() {
        return Err(Error::EncodingSizeMismatch { expected: out.len(), found: produced });
    }
    Ok(produced)
}

// Shapes, searches and quantizes the sample at `upcoming.position`.
fn encode_sample(state: &mut ChannelState, shaping: NoiseShaping, upcoming: Upcoming,
    depth: usize) -> u8 {

    let target = shaping.shape(state, i32::from(upcoming.samples[upcoming.position]));
    let (nibble, _) = minimum_error(state, target, upcoming, depth);
    state.apply_nibble(nibble);
    if shaping.is_active() {
        state.shaping_error += i32::from(state.sample);
    }
    nibble
}
