//! Renders one letter's signal graph onto the session bus.

use std::f64::consts::PI;

use rand::Rng;

use crate::graph::{Layer, Source, VoiceGraph};

use super::filter::BiquadFilter;
use super::noise::white;
use super::oscillator::Oscillator;

/// Samples between cutoff updates on an automated filter.
const CONTROL_INTERVAL: usize = 32;

enum Generator {
    Tone(Oscillator),
    Noise,
}

/// Runtime state for one layer.
struct LayerVoice {
    layer: Layer,
    generator: Generator,
    filter: Option<BiquadFilter>,
}

impl LayerVoice {
    fn new(layer: &Layer, sample_rate: f64) -> Self {
        let generator = match &layer.source {
            Source::Oscillator { waveform, detune, .. } => {
                let mut osc = Oscillator::new(*waveform, sample_rate);
                osc.set_detune(*detune);
                Generator::Tone(osc)
            }
            Source::Noise => Generator::Noise,
        };
        let filter = layer.filter.as_ref().map(|f| {
            BiquadFilter::new(f.kind, f.frequency.value_at(layer.start), f.q, sample_rate)
        });
        LayerVoice {
            layer: layer.clone(),
            generator,
            filter,
        }
    }

    fn render_into<R: Rng + ?Sized>(
        &mut self,
        origin: f64,
        offset: usize,
        sample_rate: f64,
        rng: &mut R,
        out: &mut [f64],
    ) {
        let layer = &self.layer;
        let first = ((layer.start - origin) * sample_rate).ceil().max(0.0) as usize;
        let last = ((layer.stop - origin) * sample_rate).ceil().max(0.0) as usize;
        let automated_cutoff = layer
            .filter
            .as_ref()
            .is_some_and(|f| !f.frequency.is_constant());

        for i in first.max(offset)..last.min(offset + out.len()) {
            let t = origin + i as f64 / sample_rate;

            let raw = match (&mut self.generator, &layer.source) {
                (Generator::Tone(osc), Source::Oscillator { frequency, vibrato, .. }) => {
                    let mut freq = frequency.value_at(t);
                    if let Some(v) = vibrato {
                        freq += v.depth * (2.0 * PI * v.rate * (t - layer.start)).sin();
                    }
                    osc.next_sample(freq)
                }
                _ => white(rng),
            };

            let shaped = match (&mut self.filter, &layer.filter) {
                (Some(filter), Some(filter_spec)) => {
                    if automated_cutoff && (i - first) % CONTROL_INTERVAL == 0 {
                        filter.set_frequency(filter_spec.frequency.value_at(t));
                    }
                    filter.process(raw)
                }
                _ => raw,
            };

            out[i - offset] += shaped * layer.gain.value_at(t);
        }
    }
}

/// A letter's voice: every layer of its graph, ready to render.
pub struct Voice {
    layers: Vec<LayerVoice>,
    sample_rate: f64,
}

impl Voice {
    pub fn new(graph: &VoiceGraph, sample_rate: f64) -> Self {
        Voice {
            layers: graph
                .layers
                .iter()
                .map(|layer| LayerVoice::new(layer, sample_rate))
                .collect(),
            sample_rate,
        }
    }

    /// Add this voice into `out`, where `out[0]` is frame `offset` counted
    /// from render time `origin`. Successive windows continue the same
    /// oscillator and filter state.
    pub fn render_into<R: Rng + ?Sized>(&mut self, origin: f64, offset: usize, rng: &mut R, out: &mut [f64]) {
        for layer in &mut self.layers {
            layer.render_into(origin, offset, self.sample_rate, rng, out);
        }
    }
}
