//! Voice recipes, one pure function per mode, turning a scheduled letter into
//! the signal graph that sounds it.
//!
//! Every recipe places its layers at the note's absolute render time, so the
//! renderer needs no knowledge of sessions or onsets.

use crate::dsp::automation::Automation;
use crate::dsp::filter::FilterType;
use crate::dsp::oscillator::Waveform;
use crate::graph::{FilterSpec, Layer, Source, VoiceGraph};
use crate::schedule::LetterEvent;
use crate::tables;

/// A letter ready to be voiced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Position in the cleaned sequence.
    pub index: usize,
    pub letter: char,
    pub frequency: f64,
    pub is_vowel: bool,
    /// Absolute render time the note starts.
    pub start: f64,
    /// The session's onset interval.
    pub slot: f64,
}

impl Note {
    pub fn new(event: &LetterEvent, session_start: f64, slot: f64) -> Note {
        Note {
            index: event.index,
            letter: event.letter,
            frequency: event.frequency,
            is_vowel: event.is_vowel,
            start: session_start + event.onset,
            slot,
        }
    }

    fn voice(&self, layers: Vec<Layer>) -> VoiceGraph {
        VoiceGraph {
            index: self.index,
            letter: self.letter,
            layers,
        }
    }
}

fn layer(source: Source, filter: Option<FilterSpec>, gain: Automation, start: f64, stop: f64) -> Layer {
    Layer {
        source,
        filter,
        gain,
        start,
        stop,
    }
}

/// Attack/decay/sustain/release shape shared by the ethereal voices.
struct Adsr {
    attack: f64,
    decay: f64,
    sustain: f64,
    release: f64,
}

const VOWEL_ADSR: Adsr = Adsr { attack: 0.05, decay: 0.15, sustain: 0.6, release: 0.2 };
const CONSONANT_ADSR: Adsr = Adsr { attack: 0.005, decay: 0.08, sustain: 0.2, release: 0.08 };
const CONSONANT_TIMBRES: [Waveform; 4] = [
    Waveform::Triangle,
    Waveform::Triangle,
    Waveform::Sawtooth,
    Waveform::Square,
];

impl Adsr {
    fn envelope(&self, t: f64, duration: f64, peak: f64) -> Automation {
        let held = peak * self.sustain;
        Automation::new(0.0)
            .set(t, 0.0)
            .linear_to(t + self.attack, peak)
            .linear_to(t + self.attack + self.decay, held)
            .set(t + duration - self.release, held)
            .linear_to(t + duration, 0.0)
    }
}

/// Vowels are soft sines with an octave shimmer; consonants cycle through
/// brighter waveforms with short percussive envelopes.
pub fn ethereal(note: &Note) -> VoiceGraph {
    let t = note.start;
    let (adsr, waveform, duration, peak, cutoff) = if note.is_vowel {
        (&VOWEL_ADSR, Waveform::Sine, note.slot * 1.5, 0.8, 2000.0)
    } else {
        let timbre = tables::letter_index(note.letter).unwrap_or(0) % CONSONANT_TIMBRES.len();
        (&CONSONANT_ADSR, CONSONANT_TIMBRES[timbre], note.slot * 0.9, 0.5, 3000.0)
    };

    // Buzzy waveforms sit slightly flat for warmth.
    let frequency = match waveform {
        Waveform::Sawtooth | Waveform::Square => note.frequency * 0.995,
        _ => note.frequency,
    };
    let stop = t + duration + 0.1;

    let mut layers = vec![layer(
        Source::tone(waveform, frequency),
        Some(FilterSpec::new(FilterType::Lowpass, cutoff, 0.5)),
        adsr.envelope(t, duration, peak),
        t,
        stop,
    )];

    if note.is_vowel {
        let shimmer = Automation::new(0.0)
            .set(t, 0.0)
            .linear_to(t + adsr.attack * 1.5, peak * 0.15)
            .linear_to(t + duration, 0.0);
        layers.push(layer(
            Source::tone(Waveform::Sine, note.frequency * 2.0),
            None,
            shimmer,
            t,
            stop,
        ));
    }

    note.voice(layers)
}

const PIANO_PARTIALS: [(f64, f64); 3] = [(1.0, 1.0), (2.0, 0.2), (3.0, 0.08)];

/// Additive sine partials with a hammer-fast attack and a long exponential tail.
pub fn piano(note: &Note) -> VoiceGraph {
    let t = note.start;
    let peak = 0.6;
    let hit = t + 0.005;
    let release_end = hit + note.slot + 1.5;
    let envelope = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(hit, peak)
        .exponential_to(hit + note.slot, peak * 0.3)
        .exponential_to(release_end, 0.0001);
    let filter = FilterSpec::new(FilterType::Lowpass, 5000.0, 0.7);

    let layers = PIANO_PARTIALS
        .iter()
        .map(|&(ratio, weight)| {
            layer(
                Source::tone(Waveform::Sine, note.frequency * ratio),
                Some(filter.clone()),
                envelope.scaled(weight),
                t,
                release_end + 0.05,
            )
        })
        .collect();

    note.voice(layers)
}

/// Slow swelling sines over a band of filtered noise, overlapping into a wash.
pub fn ocean(note: &Note) -> VoiceGraph {
    let t = note.start;
    let duration = note.slot * 2.5;
    let peak = 0.5;
    let stop = t + duration + 0.1;

    let swell = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.1, peak)
        .linear_to(t + duration * 0.5, peak * 0.8)
        .linear_to(t + duration, 0.0);
    let surf = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + duration * 0.4, 0.15)
        .linear_to(t + duration, 0.0);
    let band = (note.frequency * 4.0).clamp(400.0, 2400.0);

    note.voice(vec![
        layer(
            Source::tone(Waveform::Sine, note.frequency),
            Some(FilterSpec::new(FilterType::Lowpass, 1500.0, 0.5)),
            swell,
            t,
            stop,
        ),
        layer(
            Source::Noise,
            Some(FilterSpec::new(FilterType::Bandpass, band, 0.7)),
            surf,
            t,
            stop,
        ),
    ])
}

/// A bare square wave, gated tight.
pub fn eight_bit(note: &Note) -> VoiceGraph {
    let t = note.start;
    let duration = note.slot * 0.7;
    let peak = 0.3;
    let gate = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.001, peak)
        .linear_to(t + 0.051, peak * 0.7)
        .set(t + duration - 0.01, peak * 0.7)
        .linear_to(t + duration, 0.0);

    note.voice(vec![layer(
        Source::tone(Waveform::Square, note.frequency),
        None,
        gate,
        t,
        t + duration + 0.02,
    )])
}

pub fn crystal(note: &Note) -> VoiceGraph {
    let t = note.start;
    let peak = 0.55;
    let waveform = if note.index % 2 == 0 { Waveform::Sine } else { Waveform::Triangle };
    let ring_end = t + note.slot + 1.0;
    let strike = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.002, peak)
        .linear_to(t + 0.052, peak * 0.35)
        .exponential_to(ring_end, 0.0001);

    note.voice(vec![layer(
        Source::tone(waveform, note.frequency),
        None,
        strike,
        t,
        ring_end + 0.05,
    )])
}

/// Warm sawtooth with a slow vibrato behind a dark lowpass.
pub fn jazz(note: &Note) -> VoiceGraph {
    let t = note.start;
    let duration = note.slot * 0.95;
    let peak = 0.35;
    let envelope = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.02, peak)
        .linear_to(t + 0.12, peak * 0.6)
        .set(t + duration, peak * 0.6)
        .linear_to(t + duration + 0.1, 0.0);

    note.voice(vec![layer(
        Source::tone(Waveform::Sawtooth, note.frequency).with_vibrato(5.0, note.frequency * 0.005),
        Some(FilterSpec::new(FilterType::Lowpass, 1200.0, 1.0)),
        envelope,
        t,
        t + duration + 0.15,
    )])
}

/// (frequency ratio, waveform, gain) for the fire stack: unison, fifth, sub-octave.
const FIRE_STACK: [(f64, Waveform, f64); 3] = [
    (1.0, Waveform::Triangle, 1.0),
    (1.5, Waveform::Triangle, 0.5),
    (0.5, Waveform::Sine, 0.4),
];

/// Pitch-gliding triangle stack under a closing filter, plus a crackle burst.
pub fn fire(note: &Note) -> VoiceGraph {
    let t = note.start;
    let duration = note.slot * 1.1;
    let stop = t + duration + 0.2;

    let sweep = FilterSpec::sweep(
        FilterType::Lowpass,
        Automation::new(2500.0).set(t, 2500.0).exponential_to(t + duration, 800.0),
        1.0,
    );
    let envelope = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.01, 0.4)
        .exponential_to(t + duration, 0.12)
        .linear_to(t + duration + 0.15, 0.0);

    let mut layers: Vec<Layer> = FIRE_STACK
        .iter()
        .map(|&(ratio, waveform, weight)| {
            let base = note.frequency * ratio;
            let glide = Automation::new(base)
                .set(t, base * 1.02)
                .exponential_to(t + 0.06, base);
            layer(
                Source::glide(waveform, glide),
                Some(sweep.clone()),
                envelope.scaled(weight),
                t,
                stop,
            )
        })
        .collect();

    let crackle = Automation::new(0.0).set(t, 0.25).exponential_to(t + 0.05, 0.001);
    layers.push(layer(
        Source::Noise,
        Some(FilterSpec::new(FilterType::Bandpass, 3000.0, 1.5)),
        crackle,
        t,
        t + 0.06,
    ));

    note.voice(layers)
}

/// Two sines a few cents apart beat slowly against a soft octave.
pub fn love(note: &Note) -> VoiceGraph {
    let t = note.start;
    let duration = note.slot * 2.0;
    let peak = 0.4;
    let stop = t + duration + 0.45;
    let breath = Automation::new(0.0)
        .set(t, 0.0)
        .linear_to(t + 0.15, peak)
        .linear_to(t + duration, peak * 0.7)
        .linear_to(t + duration + 0.4, 0.0);
    let filter = FilterSpec::new(FilterType::Lowpass, 1800.0, 0.5);

    let sources = [
        (Source::tone(Waveform::Sine, note.frequency).detuned(3.0), 0.5),
        (Source::tone(Waveform::Sine, note.frequency).detuned(-3.0), 0.5),
        (Source::tone(Waveform::Sine, note.frequency * 2.0), 0.12),
    ];
    let layers = sources
        .into_iter()
        .map(|(source, weight)| layer(source, Some(filter.clone()), breath.scaled(weight), t, stop))
        .collect();

    note.voice(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    fn note(letter: char, index: usize) -> Note {
        Note {
            index,
            letter,
            frequency: tables::frequency(Mode::Ethereal, letter),
            is_vowel: tables::is_vowel(letter),
            start: 2.0,
            slot: 0.25,
        }
    }

    fn frequency_of(layer: &Layer) -> f64 {
        match &layer.source {
            Source::Oscillator { frequency, .. } => frequency.value_at(layer.start + 1.0),
            Source::Noise => panic!("expected an oscillator"),
        }
    }

    #[test]
    fn ethereal_vowels_get_a_shimmer() {
        let a = ethereal(&note('a', 0));
        assert_eq!(a.layers.len(), 2);
        assert_eq!(a.layers[0].source.waveform(), Some(Waveform::Sine));
        assert!((frequency_of(&a.layers[1]) - 2.0 * frequency_of(&a.layers[0])).abs() < 1e-9);
        // Shimmer peaks at 15% of the 0.8 vowel peak.
        assert!((a.layers[1].gain.peak() - 0.12).abs() < 1e-9);
        assert!((a.layers[0].gain.peak() - 0.8).abs() < 1e-9);

        let b = ethereal(&note('b', 1));
        assert_eq!(b.layers.len(), 1);
        assert!((b.layers[0].gain.peak() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ethereal_consonants_cycle_timbres() {
        let waveform = |c: char| ethereal(&note(c, 0)).layers[0].source.waveform();
        assert_eq!(waveform('b'), Some(Waveform::Triangle));
        assert_eq!(waveform('c'), Some(Waveform::Sawtooth));
        assert_eq!(waveform('d'), Some(Waveform::Square));
        assert_eq!(waveform('f'), Some(Waveform::Triangle));
        assert_eq!(waveform('m'), Some(Waveform::Triangle));

        let c = ethereal(&note('c', 0));
        let expected = tables::frequency(Mode::Ethereal, 'c') * 0.995;
        assert!((frequency_of(&c.layers[0]) - expected).abs() < 1e-9);
    }

    #[test]
    fn ethereal_vowel_envelope_is_longer() {
        let a = ethereal(&note('a', 0));
        let b = ethereal(&note('b', 0));
        assert!((a.end() - (2.0 + 0.25 * 1.5 + 0.1)).abs() < 1e-9);
        assert!((b.end() - (2.0 + 0.25 * 0.9 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn only_ethereal_cares_about_vowels() {
        for mode in Mode::ALL {
            let vowel = Note { is_vowel: true, ..note('k', 3) };
            let consonant = Note { is_vowel: false, ..note('k', 3) };
            let same = mode.voice(&vowel) == mode.voice(&consonant);
            assert_eq!(same, mode != Mode::Ethereal, "{mode}");
        }
    }

    #[test]
    fn piano_partials() {
        let v = piano(&note('c', 0));
        assert_eq!(v.layers.len(), 3);
        let f = frequency_of(&v.layers[0]);
        assert!((frequency_of(&v.layers[1]) - 2.0 * f).abs() < 1e-9);
        assert!((frequency_of(&v.layers[2]) - 3.0 * f).abs() < 1e-9);
        let peaks: Vec<f64> = v.layers.iter().map(|l| l.gain.peak()).collect();
        assert!((peaks[0] - 0.6).abs() < 1e-9);
        assert!((peaks[1] - 0.12).abs() < 1e-9);
        assert!((peaks[2] - 0.048).abs() < 1e-9);
        // Attack lands 5 ms in.
        assert!((v.layers[0].gain.value_at(2.005) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn ocean_noise_band_is_clamped() {
        let mut low = note('a', 0);
        low.frequency = 50.0;
        let v = ocean(&low);
        let band = v.layers[1].filter.as_ref().unwrap();
        assert_eq!(v.layers[1].source, Source::Noise);
        assert_eq!(band.kind, FilterType::Bandpass);
        assert_eq!(band.frequency.value_at(2.0), 400.0);

        low.frequency = 2000.0;
        let v = ocean(&low);
        assert_eq!(v.layers[1].filter.as_ref().unwrap().frequency.value_at(2.0), 2400.0);
        assert!((v.end() - (2.0 + 0.25 * 2.5 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn eight_bit_is_short_square() {
        let v = eight_bit(&note('g', 0));
        assert_eq!(v.layers.len(), 1);
        assert_eq!(v.layers[0].source.waveform(), Some(Waveform::Square));
        assert!((v.layers[0].gain.value_at(2.001) - 0.3).abs() < 1e-9);
        assert!(v.end() < 2.0 + 0.25);
    }

    #[test]
    fn crystal_alternates_waveforms() {
        assert_eq!(crystal(&note('a', 0)).layers[0].source.waveform(), Some(Waveform::Sine));
        assert_eq!(crystal(&note('a', 1)).layers[0].source.waveform(), Some(Waveform::Triangle));
        assert_eq!(crystal(&note('a', 2)).layers[0].source.waveform(), Some(Waveform::Sine));
        assert!(crystal(&note('a', 0)).end() > 2.0 + 1.0);
    }

    #[test]
    fn jazz_vibrato_and_filter() {
        let n = note('e', 0);
        let v = jazz(&n);
        match &v.layers[0].source {
            Source::Oscillator { waveform, vibrato, .. } => {
                assert_eq!(*waveform, Waveform::Sawtooth);
                let vibrato = vibrato.expect("jazz has vibrato");
                assert_eq!(vibrato.rate, 5.0);
                assert!((vibrato.depth - n.frequency * 0.005).abs() < 1e-12);
            }
            Source::Noise => panic!("expected an oscillator"),
        }
        let filter = v.layers[0].filter.as_ref().unwrap();
        assert_eq!(filter.frequency.value_at(2.0), 1200.0);
    }

    #[test]
    fn fire_glides_into_pitch() {
        let n = note('d', 0);
        let v = fire(&n);
        assert_eq!(v.layers.len(), 4);
        let Source::Oscillator { frequency, .. } = &v.layers[0].source else {
            panic!("expected an oscillator");
        };
        assert!((frequency.value_at(2.0) - n.frequency * 1.02).abs() < 1e-9);
        assert!((frequency.value_at(2.06) - n.frequency).abs() < 1e-9);
        assert!((frequency_of(&v.layers[1]) - n.frequency * 1.5).abs() < 1e-9);
        assert!((frequency_of(&v.layers[2]) - n.frequency * 0.5).abs() < 1e-9);

        let sweep = &v.layers[0].filter.as_ref().unwrap().frequency;
        assert_eq!(sweep.value_at(2.0), 2500.0);
        assert!((sweep.value_at(2.0 + 0.25 * 1.1) - 800.0).abs() < 1e-9);

        let crackle = &v.layers[3];
        assert_eq!(crackle.source, Source::Noise);
        assert!((crackle.stop - crackle.start - 0.06).abs() < 1e-9);
    }

    #[test]
    fn love_detunes_a_pair() {
        let v = love(&note('l', 0));
        let detunes: Vec<f64> = v
            .layers
            .iter()
            .filter_map(|l| match l.source {
                Source::Oscillator { detune, .. } => Some(detune),
                Source::Noise => None,
            })
            .collect();
        assert_eq!(detunes, vec![3.0, -3.0, 0.0]);
        assert!((v.end() - (2.0 + 0.5 + 0.45)).abs() < 1e-9);
    }

    #[test]
    fn every_voice_lives_after_its_start() {
        for mode in Mode::ALL {
            for (i, letter) in "name".chars().enumerate() {
                let v = mode.voice(&note(letter, i));
                assert!(!v.layers.is_empty());
                for l in &v.layers {
                    assert!(l.start >= 2.0, "{mode} layer starts early");
                    assert!(l.stop > l.start, "{mode} layer never sounds");
                    assert!(l.gain.value_at(l.stop) < 0.01, "{mode} layer ends loud");
                }
            }
        }
    }
}
