//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::recorder::{AudioSource, AudioSourceConfig};
use crate::error::{BirdwatchError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
/// These are harmless but confusing to users.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Preferred device names for desktop PipeWire/PulseAudio environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for field recording).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `BirdwatchError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| BirdwatchError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// # Errors
/// Returns `BirdwatchError::AudioDeviceNotFound` if no input device is available.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| BirdwatchError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: We ensure that the stream is only accessed from a single thread at a time
/// through the Mutex wrapper in CpalAudioSource. The stream methods are called
/// synchronously and don't cross thread boundaries unsafely.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Real audio capture implementation using CPAL.
///
/// Captures 32-bit float audio at the configured rate and reduces it to mono
/// by keeping the first channel. Tries the configured format first, then
/// falls back to the device's default config with software conversion
/// (first-channel extraction + resampling).
///
/// The stream callback only appends to the sample buffer; all chunking and
/// staging happens on the polling thread that calls `read_samples`.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<f32>>>,
    callback_count: Arc<std::sync::atomic::AtomicU64>,
    config: AudioSourceConfig,
}

impl CpalAudioSource {
    /// Create a new CPAL audio source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the default input device.
    /// * `config` - Requested sample rate, channel count, and block size.
    ///
    /// # Errors
    /// Returns errors if the device is not found or cannot be configured.
    pub fn new(device_name: Option<&str>, config: AudioSourceConfig) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| BirdwatchError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| BirdwatchError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            callback_count: Arc::new(std::sync::atomic::AtomicU64::new(0)),
            config,
        })
    }

    /// Build the audio stream with the configured format.
    ///
    /// Tries in order:
    /// 1. f32 at the configured rate/channels — preferred path
    /// 2. Device default config — native rate/channels with software conversion
    ///
    /// Step 2 handles PipeWire setups where the ALSA compatibility layer accepts
    /// non-native configs but never fires the data callback.
    fn build_stream(&self) -> Result<cpal::Stream> {
        use std::sync::atomic::Ordering;

        let preferred_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(self.config.blocksize),
        };

        let err_callback = |err| {
            tracing::warn!("audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);
        let channels = self.config.channels as usize;
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(data.iter().step_by(channels));
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Build a stream using the device's default/native config, with software
    /// first-channel extraction and resampling (native rate → configured rate).
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;
        use std::sync::atomic::Ordering;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate();
        let native_channels = default_config.channels() as usize;
        let target_rate = self.config.sample_rate;

        let stream_config: cpal::StreamConfig = default_config.clone().into();

        tracing::info!(
            "using native audio format ({}ch/{}Hz/{:?}), converting in software",
            native_channels,
            native_rate,
            default_config.sample_format(),
        );

        let err_callback = |err| {
            tracing::warn!("audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);

        match default_config.sample_format() {
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let converted =
                            convert_to_mono(data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let f32_data: Vec<f32> =
                            data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                        let converted =
                            convert_to_mono(&f32_data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            fmt => Err(BirdwatchError::AudioCapture {
                message: format!(
                    "Unsupported native sample format: {:?}. \
                     Try specifying a device with --device.",
                    fmt
                ),
            }),
        }
    }
}

/// Reduce multi-channel audio to mono (first channel only) and resample
/// to the target rate.
fn convert_to_mono(samples: &[f32], channels: usize, source_rate: u32, target_rate: u32) -> Vec<f32> {
    let mono: Vec<f32> = if channels <= 1 {
        samples.to_vec()
    } else {
        samples.iter().copied().step_by(channels).collect()
    };

    if source_rate == target_rate {
        mono
    } else {
        resample(&mono, source_rate, target_rate)
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as f32
            }
        })
        .collect()
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        use std::sync::atomic::Ordering;

        {
            let stream_guard = self
                .stream
                .lock()
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to lock stream: {}", e),
                })?;
            if stream_guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| BirdwatchError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        // Wait briefly to check if the CPAL callback actually fires.
        // Some PipeWire-ALSA setups accept non-native configs but never deliver data.
        std::thread::sleep(std::time::Duration::from_millis(200));

        let final_stream = if self.callback_count.load(Ordering::Relaxed) == 0 {
            // Preferred config didn't deliver data — stop it, clear buffer, try native
            drop(stream);
            if let Ok(mut buf) = self.buffer.lock() {
                buf.clear();
            }

            let native_stream = self.build_stream_native()?;
            native_stream
                .play()
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to start native audio stream: {}", e),
                })?;
            native_stream
        } else {
            stream
        };

        let mut stream_guard = self
            .stream
            .lock()
            .map_err(|e| BirdwatchError::AudioCapture {
                message: format!("Failed to lock stream: {}", e),
            })?;
        *stream_guard = Some(SendableStream(final_stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut stream_guard = self
            .stream
            .lock()
            .map_err(|e| BirdwatchError::AudioCapture {
                message: format!("Failed to lock stream: {}", e),
            })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| BirdwatchError::AudioCapture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|e| BirdwatchError::AudioCapture {
                message: format!("Failed to lock audio buffer: {}", e),
            })?;

        Ok(std::mem::take(&mut *buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("Digital Output S/PDIF"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("USB Audio CODEC"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PipeWire"));
        assert!(is_preferred_device("pulse"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_convert_to_mono_keeps_first_channel() {
        // Interleaved stereo: left channel ascending, right channel negated
        let samples = vec![0.1f32, -0.1, 0.2, -0.2, 0.3, -0.3];
        let mono = convert_to_mono(&samples, 2, 48_000, 48_000);
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_convert_to_mono_passthrough() {
        let samples = vec![0.5f32, 0.6, 0.7];
        let mono = convert_to_mono(&samples, 1, 44_100, 44_100);
        assert_eq!(mono, samples);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.0f32, 0.5, 1.0];
        assert_eq!(resample(&samples, 44_100, 44_100), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let out = resample(&samples, 44_100, 22_050);
        assert_eq!(out.len(), 50);
    }

    #[test]
    fn test_resample_doubles_length() {
        let samples: Vec<f32> = (0..50).map(|i| i as f32 / 50.0).collect();
        let out = resample(&samples, 22_050, 44_100);
        assert_eq!(out.len(), 100);
        // Interpolated values stay within the input range
        assert!(out.iter().all(|&s| (0.0..1.0).contains(&s)));
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 44_100, 16_000).is_empty());
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_list_devices_returns_at_least_one_device() {
        let devices = list_devices().unwrap();
        assert!(!devices.is_empty(), "Expected at least one audio device");
    }

    #[test]
    fn test_create_with_invalid_device_name() {
        let source = CpalAudioSource::new(
            Some("NonExistentDevice12345"),
            AudioSourceConfig::default(),
        );
        match source {
            Err(BirdwatchError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "NonExistentDevice12345");
            }
            Err(BirdwatchError::AudioCapture { .. }) => {
                // Device enumeration itself can fail on machines without audio
            }
            _ => panic!("Expected an audio error"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_audio_source_trait_implementation() {
        let mut source =
            CpalAudioSource::new(None, AudioSourceConfig::default()).expect("create source");

        source.start().expect("start capture");
        source.read_samples().expect("read samples");
        source.stop().expect("stop capture");
    }
}
