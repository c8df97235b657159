//! Noise shaping feeds the quantization error of previous samples back into the next input
//! sample, moving the noise away from the frequencies where it is most audible.

use crate::adpcm_ima::ChannelState;

/// Noise shaping filter applied by the encoder before quantizing a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseShaping {
    /// No error feedback.
    Off,
    /// First-order error feedback, used for sample rates above 64000 Hz.
    Static,
    /// Error feedback with a gain adapted from a second-difference predictor.
    Dynamic,
}

impl NoiseShaping {
    /// Picks the shaping mode for an encoder.
    pub fn select(enabled: bool, sample_rate: u32) -> NoiseShaping {
        if !enabled {
            NoiseShaping::Off
        } else if sample_rate > 64000 {
            NoiseShaping::Static
        } else {
            NoiseShaping::Dynamic
        }
    }

    /// `true` unless shaping is off.
    pub fn is_active(self) -> bool {
        self != NoiseShaping::Off
    }

    /// Returns the shaped version of `sample` and updates the shaping values of `state`.
    ///
    /// After the shaped sample has been quantized, the caller adds the reconstructed sample
    /// to `state.shaping_error` to complete the error term for the next sample.
    pub fn shape(self, state: &mut ChannelState, sample: i32) -> i32 {
        match self {
            NoiseShaping::Off => sample,
            NoiseShaping::Static => shape_static(state, sample),
            NoiseShaping::Dynamic => shape_dynamic(state, sample),
        }
    }
}

fn shape_static(state: &mut ChannelState, sample: i32) -> i32 {
    let shaped = sample - state.shaping_error;
    state.shaping_error = -shaped;
    shaped
}

// The arithmetic (including 32-bit wraparound) is part of the bitstream: any change here
// changes the encoded output.
fn shape_dynamic(state: &mut ChannelState, mut sample: i32) -> i32 {
    let history = state.shaping_history;
    let predicted = (3 * history[0] - history[1]) >> 1;
    let residual = sample - (state.shaping_weight.wrapping_mul(predicted).wrapping_add(512) >> 10);

    // +2 when prediction and residual agree in sign, -2 when they differ
    if predicted != 0 && residual != 0 {
        state.shaping_weight -= (((predicted ^ residual) >> 29) & 4) - 2;
    }

    state.shaping_history = [sample, history[0]];

    let gain = if state.shaping_weight < 256 {
        1024
    } else {
        1536 - state.shaping_weight.wrapping_mul(2)
    };
    let mut feedback = -(gain.wrapping_mul(state.shaping_error).wrapping_add(512) >> 10);

    if gain < 0 && feedback != 0 {
        // a negative gain must not feed back the error unchanged, or the filter locks up
        if feedback == state.shaping_error {
            feedback = if feedback < 0 { feedback + 1 } else { feedback - 1 };
        }
        state.shaping_error = -sample;
        sample += feedback;
    } else {
        sample += feedback;
        state.shaping_error = -sample;
    }
    sample
}
