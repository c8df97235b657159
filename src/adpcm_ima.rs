#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

/// Largest valid index into the step size table.
pub const MAX_STEP_INDEX: u8 = 88;

// only the magnitude bits select the index adjustment, so the sign bit is masked off before lookup
const IMA_INDEX_TABLE: &[i8; 8] = &[
    -1, -1, -1, -1, 2, 4, 6, 8
];

const IMA_STEP_TABLE: &[i16; 89] = &[
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17,
    19, 21, 23, 25, 28, 31, 34, 37, 41, 45,
    50, 55, 60, 66, 73, 80, 88, 97, 107, 118,
    130, 143, 157, 173, 190, 209, 230, 253, 279, 307,
    337, 371, 408, 449, 494, 544, 598, 658, 724, 796,
    876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358,
    5894, 6484, 7132, 7845, 8630, 9493, 10442, 11487, 12635, 13899,
    15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767
];

/// Returns the quantizer step size for `step_index`. Indexes above 88 are treated as 88.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn step_size(step_index: u8) -> i32 {
    i32::from(IMA_STEP_TABLE[usize::from(step_index.min(MAX_STEP_INDEX))])
}

/// Adaptive quantizer state of one audio channel.
///
/// The state is a small plain value: copying it is how the encoder explores hypothetical
/// codes without touching the real state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelState {
    /// Current reconstructed sample value.
    pub sample: i16,
    /// Index into the step size table (0..=88).
    pub step_index: u8,
    /// The last two input samples seen by the dynamic noise shaper, newest first.
    pub shaping_history: [i32; 2],
    /// Adaptive predictor weight of the dynamic noise shaper.
    pub shaping_weight: i32,
    /// Quantization error fed back into the next input sample.
    pub shaping_error: i32,
}

impl ChannelState {
    /// Creates a state with the given reconstructed sample and step index and cleared
    /// noise shaping values.
    pub fn new(sample: i16, step_index: u8) -> ChannelState {
        ChannelState {
            sample,
            step_index: step_index.min(MAX_STEP_INDEX),
            ..ChannelState::default()
        }
    }

    /// Current quantizer step size.
    #[inline(always)]
    pub fn step_size(&self) -> i32 {
        step_size(self.step_index)
    }

    /// Sample value that `nibble` would reconstruct from this state, clamped to i16.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn predict(&self, nibble: u8) -> i16 {
        let predicted = i32::from(self.sample) + nibble_delta(self.step_size(), nibble);
        #[allow(clippy::cast_possible_truncation)] // value is clamped so truncation never happens
        let predicted = predicted.clamp(-32768, 32767) as i16;
        predicted
    }

    /// Applies a 4-bit code to the state and returns the new reconstructed sample.
    ///
    /// This is the single quantizer update shared by the encoder and the decoder, so both
    /// sides always track the same sample and step index. Only the lowest 4 bits of
    /// `nibble` are used.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn apply_nibble(&mut self, nibble: u8) -> i16 {
        let nibble = nibble & 0x0f;
        self.sample = self.predict(nibble);
        // adjust step index, clamped to 0..=88
        self.step_index = self.step_index
            .min(MAX_STEP_INDEX)
            .saturating_add_signed(IMA_INDEX_TABLE[usize::from(nibble & 0x07)])
            .min(MAX_STEP_INDEX);
        self.sample
    }
}

/// Signed difference that `nibble` adds to the reconstructed sample for the given step size.
///
/// Bit 3 of the nibble is the sign, bits 0..=2 select `step/4`, `step/2` and `step` on top
/// of the base `step/8`.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn nibble_delta(step_size: i32, nibble: u8) -> i32 {
    let mut delta = step_size >> 3;
    if (nibble & 1) != 0 { delta += step_size >> 2; }
    if (nibble & 2) != 0 { delta += step_size >> 1; }
    if (nibble & 4) != 0 { delta += step_size; }
    if (nibble & 8) != 0 {
        -delta
    } else {
        delta
    }
}

/// The code whose magnitude best matches `diff` on its own, without looking ahead.
///
/// The sign bit is set for negative differences and the magnitude is
/// `min(7, 4 * |diff| / step_size)`.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub(crate) fn greedy_nibble(diff: i32, step_size: i32) -> u8 {
    let (sign, magnitude) = if diff < 0 {
        (0x08, (-diff << 2) / step_size)
    } else {
        (0x00, (diff << 2) / step_size)
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=7
    let magnitude = magnitude.clamp(0, 7) as u8;
    sign | magnitude
}
