//! Real-time output: a cpal stream pulling blocks from a `RenderContext`.

use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info, warn};

use crate::context::RenderContext;
use crate::error::Error;

/// Start the default output device on a dedicated thread.
///
/// The thread owns the stream for the rest of the process. If the device
/// cannot be opened the context stays suspended and the failure is logged.
pub fn start(context: Arc<RenderContext>) {
    let spawned = thread::Builder::new()
        .name("namesong-audio".into())
        .spawn(move || match open_stream(&context) {
            Ok(_stream) => {
                context.set_running(true);
                debug!("audio output running");
                // The stream stops when dropped; hold it on this thread for good.
                loop {
                    thread::park();
                }
            }
            Err(err) => error!("audio output unavailable, context stays suspended: {err}"),
        });

    if let Err(err) = spawned {
        error!("failed to spawn audio output thread: {err}");
    }
}

/// The default output device and its preferred stream config.
fn default_output() -> Result<(cpal::Device, cpal::SupportedStreamConfig), Error> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| Error::Device("no output device available".into()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| Error::Device(format!("failed to get default output config: {e}")))?;
    Ok((device, supported))
}

/// Sample rate the default output device runs at.
pub fn default_sample_rate() -> Result<u32, Error> {
    let (_, supported) = default_output()?;
    Ok(supported.sample_rate().0)
}

/// Pick the render rate for a device-backed context: the device's rate when
/// it can be read, the configured one otherwise.
pub(crate) fn resolve_sample_rate(configured: u32, device: Result<u32, Error>) -> u32 {
    match device {
        Ok(rate) if rate != configured => {
            warn!(configured, device = rate, "output device runs at a different rate; rendering at the device rate");
            rate
        }
        Ok(rate) => rate,
        Err(err) => {
            warn!("could not read the output device rate, keeping {configured} Hz: {err}");
            configured
        }
    }
}

fn open_stream(context: &Arc<RenderContext>) -> Result<cpal::Stream, Error> {
    let (device, supported) = default_output()?;
    let config = supported.config();
    if config.sample_rate.0 != context.sample_rate() {
        return Err(Error::Device(format!(
            "device rate {} Hz no longer matches the render context's {} Hz",
            config.sample_rate.0,
            context.sample_rate()
        )));
    }
    info!(
        device = %device.name().unwrap_or_default(),
        channels = config.channels,
        sample_rate = config.sample_rate.0,
        format = ?supported.sample_format(),
        "opening audio output"
    );

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(context)),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(context)),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(context)),
        other => Err(Error::Device(format!("unsupported sample format {other:?}"))),
    }?;

    stream
        .play()
        .map_err(|e| Error::Device(format!("failed to start audio stream: {e}")))?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    context: Arc<RenderContext>,
) -> Result<cpal::Stream, Error>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut block: Vec<f32> = vec![0.0; 4096];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if block.len() < data.len() {
                    block.resize(data.len(), 0.0);
                }
                let block = &mut block[..data.len()];
                context.render(block, channels);
                for (out, &sample) in data.iter_mut().zip(block.iter()) {
                    *out = T::from_sample(sample);
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| Error::Device(format!("failed to build audio stream: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_rate_wins_over_config() {
        assert_eq!(resolve_sample_rate(44100, Ok(48000)), 48000);
        assert_eq!(resolve_sample_rate(48000, Ok(48000)), 48000);
    }

    #[test]
    fn unreadable_device_keeps_configured_rate() {
        let err = Error::Device("no output device available".into());
        assert_eq!(resolve_sample_rate(44100, Err(err)), 44100);
    }
}
