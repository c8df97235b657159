use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ima_adpcm_block::{BlockSize, Decoder, Encoder, EncoderConfig};

fn signal(frames: usize, channels: usize) -> Vec<i16> {
    (0..frames * channels).map(|i| {
        let t = (i / channels) as f64;
        let freq = 0.01 + 0.004 * (i % channels) as f64;
        ((t * freq).sin() * 20000.0) as i16
    }).collect()
}

fn config(channels: usize, sample_rate: u32, noise_shaping: bool) -> EncoderConfig {
    EncoderConfig::builder()
        .channels(channels)
        .sample_rate(sample_rate)
        .noise_shaping(noise_shaping)
        .block_size(BlockSize::Auto)
        .build()
        .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let stereo = signal(44100, 2);

    // encode one second of audio with each noise shaping mode
    for (name, sample_rate, noise_shaping) in [
        ("encode_stereo_no_shaping", 44100, false),
        ("encode_stereo_dynamic_shaping", 44100, true),
        ("encode_stereo_static_shaping", 88200, true),
    ] {
        let config = config(2, sample_rate, noise_shaping);
        let mut out = vec![0u8; config.output_size_for(&stereo)];
        c.bench_function(name, |b| b.iter(|| {
            let mut encoder = Encoder::new(config.clone());
            black_box(encoder.encode(black_box(&stereo), &mut out).unwrap());
        }));
    }

    let config = config(2, 44100, true);
    let encoded = Encoder::new(config.clone()).encode_to_vec(&stereo).unwrap();
    let decoder = Decoder::new(config.decoder_config());
    let mut decoded = vec![0i16; stereo.len()];
    c.bench_function("decode_stereo", |b| b.iter(|| {
        black_box(decoder.decode(black_box(&encoded), &mut decoded).unwrap());
    }));
    c.bench_function("decode_block_stereo", |b| b.iter(|| {
        black_box(decoder.decode_block(black_box(&encoded[..2048]), &mut decoded).unwrap());
    }));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
