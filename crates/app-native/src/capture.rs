//! Default input device → mono sample ring.

use app_core::SampleRing;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

pub fn start_input_capture(ring: SampleRing) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("no default input device"))?;
    let config = device.default_input_config()?;
    log::info!(
        "[capture] {:?}: {} Hz, {} ch, {:?}",
        device.name().unwrap_or_default(),
        config.sample_rate().0,
        config.channels(),
        config.sample_format()
    );

    let cfg: cpal::StreamConfig = config.clone().into();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, ring, |s| s),
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &cfg, ring, |s| s as f32 / i16::MAX as f32)
        }
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, ring, |s| {
            (s as f32 / u16::MAX as f32) * 2.0 - 1.0
        }),
        other => anyhow::bail!("unsupported sample format {other:?}"),
    }?;
    stream.play()?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ring: SampleRing,
    to_f32: fn(T) -> f32,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + Send + 'static,
{
    let channels = (config.channels as usize).max(1);
    let mut mono: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _| {
            mono.clear();
            mono.extend(
                data.chunks_exact(channels)
                    .map(|frame| frame.iter().map(|&s| to_f32(s)).sum::<f32>() / channels as f32),
            );
            ring.push(&mono);
        },
        |err| log::error!("[capture] stream error: {err}"),
        None,
    )
}
