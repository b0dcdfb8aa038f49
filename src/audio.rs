//! Synthesized sound cues, rendered once at startup and replayed on demand.

use fundsp::hacker::*;
use log::warn;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

const SAMPLE_RATE: u32 = 44100;

pub struct Sounds {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    flap: Vec<f32>,
    death: Vec<f32>,
}

impl Sounds {
    pub fn new() -> Result<Self, rodio::StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            flap: flap_wave(),
            death: death_wave(),
        })
    }

    pub fn flap(&self) {
        self.play(&self.flap);
    }

    pub fn death(&self) {
        self.play(&self.death);
    }

    fn play(&self, samples: &[f32]) {
        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec());
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(source);
                sink.detach();
            }
            Err(e) => warn!("sound playback failed: {e}"),
        }
    }
}

/// Short rising triangle blip for a flap.
fn flap_wave() -> Vec<f32> {
    let freq = lfo(|t| lerp(320.0, 620.0, (t / 0.08).min(1.0)));
    let gain = lfo(|t| 0.12 * (1.0 - (t / 0.12).min(1.0)));
    render((freq >> triangle()) * gain, 0.12)
}

/// Falling sawtooth sweep when the bird dies: 400Hz down to 80Hz over 0.4s,
/// fading out over 0.5s.
fn death_wave() -> Vec<f32> {
    let freq = lfo(|t| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t| 0.15 * (1.0 - (t / 0.5).min(1.0)));
    render((freq >> saw()) * gain, 0.5)
}

fn render(mut unit: impl AudioUnit, secs: f64) -> Vec<f32> {
    unit.set_sample_rate(f64::from(SAMPLE_RATE));
    let n = (secs * f64::from(SAMPLE_RATE)) as usize;
    (0..n).map(|_| unit.get_mono()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_are_rendered_and_bounded() {
        for wave in [flap_wave(), death_wave()] {
            assert!(!wave.is_empty());
            assert!(wave.iter().all(|s| s.abs() <= 1.0));
            assert!(wave.iter().any(|s| s.abs() > 0.0));
        }
    }

    #[test]
    fn waves_fade_to_silence() {
        for wave in [flap_wave(), death_wave()] {
            let tail = &wave[wave.len() - 100..];
            assert!(tail.iter().all(|s| s.abs() < 0.02));
        }
    }
}
