//!
//! Block-based [IMA ADPCM](https://en.wikipedia.org/wiki/Interactive_Multimedia_Association)
//! encoder and decoder for 16-bit mono and stereo audio, producing the block layout used by
//! WAV files (format tag 0x0011).
//!
//! The encoder chooses every 4-bit code with a short lookahead search that minimizes the
//! reconstruction error of the next few samples, and can shape the quantization noise
//! (static shaping above 64000 Hz, dynamic shaping otherwise).
//!
//! Container handling (RIFF/WAV chunks) is left to the caller: the encoder and decoder work
//! on interleaved `i16` samples and on contiguous, block-aligned ADPCM bytes.
//!
//! ```
//! use ima_adpcm_block::{BlockSize, Decoder, Encoder, EncoderConfig};
//!
//! let config = EncoderConfig::builder()
//!     .channels(1)
//!     .sample_rate(8000)
//!     .block_size(BlockSize::Bytes(256))
//!     .build()?;
//! let samples: Vec<i16> = (0..1000).map(|i| ((i % 50) * 400 - 10000) as i16).collect();
//!
//! let mut encoder = Encoder::new(config.clone());
//! let encoded = encoder.encode_to_vec(&samples)?;
//! assert_eq!(encoded.len(), config.output_size(samples.len()));
//!
//! let decoder = Decoder::new(config.decoder_config());
//! let decoded = decoder.decode_to_vec(&encoded, samples.len())?;
//! assert_eq!(decoded.len(), samples.len());
//! # Ok::<(), ima_adpcm_block::Error>(())
//! ```
//!

#![forbid(
    unsafe_code,
    clippy::panic,
    clippy::exit,
    clippy::unimplemented,
    clippy::todo,
    clippy::unreachable,
)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_ptr_alignment,
    clippy::char_lit_as_u8,
    clippy::unnecessary_cast,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
)]
#![allow(clippy::manual_range_contains)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod adpcm_ima;
pub use adpcm_ima::{nibble_delta, step_size, ChannelState, MAX_STEP_INDEX};

pub mod block;

mod config;
pub use config::{BlockSize, ConfigError};
pub use config::{DecoderConfig, DecoderConfigBuilder, EncoderConfig, EncoderConfigBuilder};

mod context;
pub use context::BlockContext;

mod decoder;
pub use decoder::{decode_block, Decoder};

mod encoder;
pub use encoder::Encoder;

mod search;
pub use search::DEFAULT_LOOKAHEAD;

mod shaping;
pub use shaping::NoiseShaping;

/// Error values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid encoder or decoder configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A block header has a step index above 88 or a nonzero reserved byte.
    #[error("malformed block header for channel {channel}: step index {step_index}, \
        reserved byte {reserved}")]
    MalformedBlockHeader {
        channel: usize,
        step_index: u8,
        reserved: u8,
    },

    /// The input ends before the block it should contain.
    #[error("truncated input: expected {expected} bytes, found {found}")]
    TruncatedInput {
        expected: usize,
        found: usize,
    },

    /// The encoder produced a block of an unexpected size. This is a logic error, not a
    /// data error.
    #[error("unexpected number of bytes encoded; expected {expected}, found {found}")]
    EncodingSizeMismatch {
        expected: usize,
        found: usize,
    },

    /// Buffer has an invalid size.
    #[error("buffer has an invalid size")]
    InvalidBufferSize,
}
