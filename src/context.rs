use tracing::debug;

use crate::adpcm_ima::{step_size, ChannelState, MAX_STEP_INDEX};
use crate::config::ConfigError;
use crate::Error;

/// Per-channel quantizer states of one encoded stream.
///
/// The encoder seeds a context once from the first block of a stream and keeps it for every
/// following block so that the step index and noise shaping values carry over block
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    states: [ChannelState; 2],
    channels: usize,
}

impl BlockContext {
    /// Seeds a context from the interleaved samples of a block.
    ///
    /// `adpcm_samples` is the number of frames the block encodes and `samples` must hold at
    /// least that many frames for `channels` (1 or 2) channels. Each channel's step index is
    /// chosen from the average absolute difference of its consecutive samples.
    ///
    /// An error is returned if `channels` is not 1 or 2 or if `samples` holds fewer than
    /// `adpcm_samples` frames.
    pub fn new(adpcm_samples: usize, samples: &[i16], channels: usize)
        -> Result<BlockContext, Error> {

        if channels != 1 && channels != 2 {
            return Err(ConfigError::InvalidChannels(channels).into());
        }
        if adpcm_samples.checked_mul(channels).map_or(true, |n| samples.len() < n) {
            return Err(Error::InvalidBufferSize);
        }
        let deltas = initial_deltas(adpcm_samples, samples, channels);
        let mut states = [ChannelState::default(); 2];
        for (state, delta) in states.iter_mut().zip(deltas).take(channels) {
            state.step_index = initial_step_index(delta);
        }
        let step_indexes = states.map(|s| s.step_index);
        debug!(channels, step_indexes = ?&step_indexes[..channels], "seeded ADPCM block context");
        Ok(BlockContext { states, channels })
    }

    /// Number of channels (1 or 2).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Channel states in channel order.
    pub fn states(&self) -> &[ChannelState] {
        &self.states[..self.channels]
    }

    /// Mutable channel states in channel order.
    pub fn states_mut(&mut self) -> &mut [ChannelState] {
        &mut self.states[..self.channels]
    }
}

// Exponential running average (weight 1/8) of the absolute first difference, walked from the
// end of the block towards its start. Stereo tracks left and right from the same walk.
fn initial_deltas(adpcm_samples: usize, samples: &[i16], channels: usize) -> [i32; 2] {
    let mut deltas = [0i32; 2];
    let abs_diff = |a: i16, b: i16| (i32::from(a) - i32::from(b)).abs();

    let mut i = adpcm_samples.saturating_sub(1) * channels;
    while i > 0 {
        deltas[0] -= deltas[0] >> 3;
        deltas[0] += abs_diff(samples[i], samples[i - channels]);
        if channels == 2 {
            deltas[1] -= deltas[1] >> 3;
            deltas[1] += abs_diff(samples[i - 1], samples[i + 1]);
        }
        i -= channels;
    }

    deltas[0] >>= 3;
    deltas[1] >>= 3;
    deltas
}

// Smallest step index whose step size lies closer to `delta` than the next step size does.
fn initial_step_index(delta: i32) -> u8 {
    (0..MAX_STEP_INDEX)
        .find(|&i| delta < (step_size(i) + step_size(i + 1)) / 2)
        .unwrap_or(MAX_STEP_INDEX)
}
