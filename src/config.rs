use thiserror::Error;

use crate::block;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Only mono (1) and stereo (2) are supported.
    #[error("unsupported channel count: {0}; mono (1) or stereo (2) expected")]
    InvalidChannels(usize),

    /// The sample rate must be greater than zero.
    #[error("unsupported sample rate: {0}; must be greater than 0")]
    InvalidSampleRate(u32),

    /// Explicit block sizes must be a power of two between 256 and 32768.
    #[error("unsupported block size: {0}; must be a power of two >= 256 and <= 32768")]
    InvalidBlockSize(usize),
}

/// Requested size of an ADPCM block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSize {
    /// `256 * channels * max(1, sample_rate / 11000)` bytes.
    #[default]
    Auto,
    /// An explicit size in bytes: a power of two between 256 and 32768.
    Bytes(usize),
}

impl BlockSize {
    fn resolve(self, channels: usize, sample_rate: u32) -> usize {
        match self {
            BlockSize::Auto => block::default_block_size(channels, sample_rate),
            BlockSize::Bytes(size) => size,
        }
    }
}

// Checks the options shared by encoder and decoder configurations and returns the
// resolved block size.
fn validate(channels: usize, sample_rate: u32, block_size: BlockSize)
    -> Result<usize, ConfigError> {

    if channels != 1 && channels != 2 {
        return Err(ConfigError::InvalidChannels(channels));
    }
    if sample_rate == 0 {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    if let BlockSize::Bytes(size) = block_size {
        if size < block::MIN_BLOCK_SIZE || size > block::MAX_BLOCK_SIZE || !size.is_power_of_two() {
            return Err(ConfigError::InvalidBlockSize(size));
        }
    }
    Ok(block_size.resolve(channels, sample_rate))
}

/// Immutable encoder configuration. Create one with [`EncoderConfig::builder()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    channels: usize,
    sample_rate: u32,
    noise_shaping: bool,
    requested_block_size: BlockSize,
    block_size: usize,
    samples_per_block: usize,
}

impl EncoderConfig {
    /// Returns a builder with the default options: stereo, 44100 Hz, automatic block size
    /// and noise shaping on.
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::default()
    }

    /// Returns a builder initialized with the options of this configuration.
    pub fn to_builder(&self) -> EncoderConfigBuilder {
        EncoderConfigBuilder::from(self)
    }

    /// Number of input channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Input sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `true` when noise shaping is on.
    pub fn noise_shaping(&self) -> bool {
        self.noise_shaping
    }

    /// The block size option as it was given to the builder.
    pub fn requested_block_size(&self) -> BlockSize {
        self.requested_block_size
    }

    /// Output block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of samples per channel in a full block.
    pub fn samples_per_block(&self) -> usize {
        self.samples_per_block
    }

    /// Average number of encoded bytes per second.
    pub fn bytes_per_second(&self) -> u32 {
        block::bytes_per_second(self.sample_rate, self.block_size, self.samples_per_block)
    }

    /// Number of bytes the encoder produces for `frames` samples per channel.
    pub fn output_size(&self, frames: usize) -> usize {
        block::output_size(frames, self.channels, self.samples_per_block, self.block_size)
    }

    /// Number of bytes the encoder produces for the interleaved `samples`.
    pub fn output_size_for(&self, samples: &[i16]) -> usize {
        self.output_size(samples.len() / self.channels)
    }

    /// Decoder configuration for the streams produced with this configuration.
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            channels: self.channels,
            sample_rate: self.sample_rate,
            requested_block_size: self.requested_block_size,
            block_size: self.block_size,
            samples_per_block: self.samples_per_block,
        }
    }
}

/// Builder for [`EncoderConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfigBuilder {
    channels: usize,
    sample_rate: u32,
    noise_shaping: bool,
    block_size: BlockSize,
}

impl Default for EncoderConfigBuilder {
    fn default() -> Self {
        EncoderConfigBuilder {
            channels: 2,
            sample_rate: 44100,
            noise_shaping: true,
            block_size: BlockSize::Auto,
        }
    }
}

impl From<&EncoderConfig> for EncoderConfigBuilder {
    fn from(config: &EncoderConfig) -> Self {
        EncoderConfigBuilder {
            channels: config.channels,
            sample_rate: config.sample_rate,
            noise_shaping: config.noise_shaping,
            block_size: config.requested_block_size,
        }
    }
}

impl EncoderConfigBuilder {
    /// Sets the number of input channels: 1 for mono, 2 for stereo. The default is 2.
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Sets the input sample rate in Hz. The default is 44100.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Enables or disables noise shaping. Shaping reduces the apparent quantization noise.
    /// It is on by default.
    pub fn noise_shaping(mut self, enabled: bool) -> Self {
        self.noise_shaping = enabled;
        self
    }

    /// Sets the output block size. Larger blocks compress slightly better, smaller blocks
    /// sound slightly better. The default is [`BlockSize::Auto`].
    pub fn block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Validates the options and creates the configuration.
    pub fn build(self) -> Result<EncoderConfig, ConfigError> {
        let block_size = validate(self.channels, self.sample_rate, self.block_size)?;
        Ok(EncoderConfig {
            channels: self.channels,
            sample_rate: self.sample_rate,
            noise_shaping: self.noise_shaping,
            requested_block_size: self.block_size,
            block_size,
            samples_per_block: block::samples_per_block(self.channels, block_size),
        })
    }
}

/// Immutable decoder configuration. Create one with [`DecoderConfig::builder()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    channels: usize,
    sample_rate: u32,
    requested_block_size: BlockSize,
    block_size: usize,
    samples_per_block: usize,
}

impl DecoderConfig {
    /// Returns a builder with the default options: stereo, 44100 Hz and automatic block size.
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }

    /// Returns a builder initialized with the options of this configuration.
    pub fn to_builder(&self) -> DecoderConfigBuilder {
        DecoderConfigBuilder::from(self)
    }

    /// Number of output channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The block size option as it was given to the builder.
    pub fn requested_block_size(&self) -> BlockSize {
        self.requested_block_size
    }

    /// Input block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of samples per channel in a full block.
    pub fn samples_per_block(&self) -> usize {
        self.samples_per_block
    }

    /// Average number of encoded bytes per second.
    pub fn bytes_per_second(&self) -> u32 {
        block::bytes_per_second(self.sample_rate, self.block_size, self.samples_per_block)
    }
}

/// Builder for [`DecoderConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfigBuilder {
    channels: usize,
    sample_rate: u32,
    block_size: BlockSize,
}

impl Default for DecoderConfigBuilder {
    fn default() -> Self {
        DecoderConfigBuilder {
            channels: 2,
            sample_rate: 44100,
            block_size: BlockSize::Auto,
        }
    }
}

impl From<&DecoderConfig> for DecoderConfigBuilder {
    fn from(config: &DecoderConfig) -> Self {
        DecoderConfigBuilder {
            channels: config.channels,
            sample_rate: config.sample_rate,
            block_size: config.requested_block_size,
        }
    }
}

impl DecoderConfigBuilder {
    /// Sets the number of output channels: 1 for mono, 2 for stereo. The default is 2.
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Sets the output sample rate in Hz. The default is 44100.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the input block size. [`BlockSize::Auto`] (the default) uses the same formula
    /// as the encoder.
    pub fn block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Validates the options and creates the configuration.
    pub fn build(self) -> Result<DecoderConfig, ConfigError> {
        let block_size = validate(self.channels, self.sample_rate, self.block_size)?;
        Ok(DecoderConfig {
            channels: self.channels,
            sample_rate: self.sample_rate,
            requested_block_size: self.block_size,
            block_size,
            samples_per_block: block::samples_per_block(self.channels, block_size),
        })
    }
}
