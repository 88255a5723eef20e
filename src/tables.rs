//! Per-mode scales and palettes indexed by letter position.
//!
//! Index 0 is `a`, index 25 is `z`. Scales may repeat a pitch at several
//! indices. Characters outside `a`–`z` (case-insensitive) resolve to
//! [`FALLBACK_FREQUENCY`] and [`FALLBACK_COLOR`].

use crate::mode::Mode;

/// Number of letters every table covers.
pub const LETTERS: usize = 26;

/// Letter → frequency in Hz.
pub type Scale = [f64; LETTERS];

/// Letter → CSS hex colour.
pub type Palette = [&'static str; LETTERS];

pub const FALLBACK_FREQUENCY: f64 = 440.0;
pub const FALLBACK_COLOR: &str = "#ffffff";

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Zero-based alphabet position of an ASCII letter, ignoring case.
pub fn letter_index(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    lower
        .is_ascii_lowercase()
        .then(|| (lower as u8 - b'a') as usize)
}

/// `a e i o u`, ignoring case. Everything else, including non-letters, is not a vowel.
pub fn is_vowel(letter: char) -> bool {
    VOWELS.contains(&letter.to_ascii_lowercase())
}

/// Frequency and colour for `letter` in `mode`.
pub fn lookup(mode: Mode, letter: char) -> (f64, &'static str) {
    match letter_index(letter) {
        Some(idx) => (mode.scale()[idx], mode.palette()[idx]),
        None => (FALLBACK_FREQUENCY, FALLBACK_COLOR),
    }
}

pub fn frequency(mode: Mode, letter: char) -> f64 {
    lookup(mode, letter).0
}

/// Colour for the visual layer; same fallback rule as [`lookup`].
pub fn get_color(letter: char, mode: Mode) -> &'static str {
    lookup(mode, letter).1
}

// ── Scales ──────────────────────────────────────────────────

/// C/D/E/G/A pentatonic across octaves 3–6, then octave 2 for depth.
pub static ETHEREAL_SCALE: Scale = [
    130.81,  // a C3
    146.83,  // b D3
    164.81,  // c E3
    196.0,   // d G3
    220.0,   // e A3
    261.63,  // f C4
    293.66,  // g D4
    329.63,  // h E4
    392.0,   // i G4
    440.0,   // j A4
    523.25,  // k C5
    587.33,  // l D5
    659.25,  // m E5
    783.99,  // n G5
    880.0,   // o A5
    1046.5,  // p C6
    1174.66, // q D6
    1318.51, // r E6
    1567.98, // s G6
    1760.0,  // t A6
    65.41,   // u C2
    73.42,   // v D2
    82.41,   // w E2
    98.0,    // x G2
    110.0,   // y A2
    523.25,  // z C5
];

/// C major, C3 upward.
pub static PIANO_SCALE: Scale = [
    130.81,   // a C3
    146.83,   // b D3
    164.81,   // c E3
    174.61,   // d F3
    196.0,    // e G3
    220.0,    // f A3
    246.94,   // g B3
    261.63,   // h C4
    293.66,   // i D4
    329.63,   // j E4
    349.23,   // k F4
    392.0,    // l G4
    440.0,    // m A4
    493.88,   // n B4
    523.25,   // o C5
    587.33,   // p D5
    659.26,   // q E5
    698.46,   // r F5
    783.99,   // s G5
    880.0,    // t A5
    987.77,   // u B5
    1046.5,   // v C6
    1174.66,  // w D6
    1318.51,  // x E6
    1396.91,  // y F6
    1567.98,  // z G6
];

/// D major pentatonic in the low register, D2–B4 then D3–B4 again.
pub static OCEAN_SCALE: Scale = [
    73.42,    // a D2
    82.41,    // b E2
    92.5,     // c F#2
    110.0,    // d A2
    123.47,   // e B2
    146.83,   // f D3
    164.81,   // g E3
    185.0,    // h F#3
    220.0,    // i A3
    246.94,   // j B3
    293.66,   // k D4
    329.63,   // l E4
    369.99,   // m F#4
    440.0,    // n A4
    493.88,   // o B4
    146.83,   // p D3
    164.81,   // q E3
    185.0,    // r F#3
    220.0,    // s A3
    246.94,   // t B3
    293.66,   // u D4
    329.63,   // v E4
    369.99,   // w F#4
    440.0,    // x A4
    493.88,   // y B4
    587.33,   // z D5
];

/// C major pentatonic C3–A6, then the C4 octave again.
pub static EIGHT_BIT_SCALE: Scale = [
    130.81,   // a C3
    146.83,   // b D3
    164.81,   // c E3
    196.0,    // d G3
    220.0,    // e A3
    261.63,   // f C4
    293.66,   // g D4
    329.63,   // h E4
    392.0,    // i G4
    440.0,    // j A4
    523.25,   // k C5
    587.33,   // l D5
    659.26,   // m E5
    783.99,   // n G5
    880.0,    // o A5
    1046.5,   // p C6
    1174.66,  // q D6
    1318.51,  // r E6
    1567.98,  // s G6
    1760.0,   // t A6
    261.63,   // u C4
    293.66,   // v D4
    329.63,   // w E4
    392.0,    // x G4
    440.0,    // y A4
    523.25,   // z C5
];

/// G major pentatonic up high, G4–E7 then G5–E7 again.
pub static CRYSTAL_SCALE: Scale = [
    392.0,    // a G4
    440.0,    // b A4
    493.88,   // c B4
    587.33,   // d D5
    659.26,   // e E5
    783.99,   // f G5
    880.0,    // g A5
    987.77,   // h B5
    1174.66,  // i D6
    1318.51,  // j E6
    1567.98,  // k G6
    1760.0,   // l A6
    1975.53,  // m B6
    2349.32,  // n D7
    2637.02,  // o E7
    783.99,   // p G5
    880.0,    // q A5
    987.77,   // r B5
    1174.66,  // s D6
    1318.51,  // t E6
    1567.98,  // u G6
    1760.0,   // v A6
    1975.53,  // w B6
    2349.32,  // x D7
    2637.02,  // y E7
    3135.96,  // z G7
];

/// C blues scale from C2.
pub static JAZZ_SCALE: Scale = [
    65.41,    // a C2
    77.78,    // b Eb2
    87.31,    // c F2
    92.5,     // d F#2
    98.0,     // e G2
    116.54,   // f Bb2
    130.81,   // g C3
    155.56,   // h Eb3
    174.61,   // i F3
    185.0,    // j F#3
    196.0,    // k G3
    233.08,   // l Bb3
    261.63,   // m C4
    311.13,   // n Eb4
    349.23,   // o F4
    369.99,   // p F#4
    392.0,    // q G4
    466.16,   // r Bb4
    523.25,   // s C5
    622.25,   // t Eb5
    698.46,   // u F5
    739.99,   // v F#5
    783.99,   // w G5
    932.33,   // x Bb5
    1046.5,   // y C6
    1244.51,  // z Eb6
];

/// E phrygian dominant from E2.
pub static FIRE_SCALE: Scale = [
    82.41,    // a E2
    87.31,    // b F2
    103.83,   // c G#2
    110.0,    // d A2
    123.47,   // e B2
    130.81,   // f C3
    146.83,   // g D3
    164.81,   // h E3
    174.61,   // i F3
    207.65,   // j G#3
    220.0,    // k A3
    246.94,   // l B3
    261.63,   // m C4
    293.66,   // n D4
    329.63,   // o E4
    349.23,   // p F4
    415.3,    // q G#4
    440.0,    // r A4
    493.88,   // s B4
    523.25,   // t C5
    587.33,   // u D5
    659.26,   // v E5
    698.46,   // w F5
    830.61,   // x G#5
    880.0,    // y A5
    987.77,   // z B5
];

/// F major from F2.
pub static LOVE_SCALE: Scale = [
    87.31,    // a F2
    98.0,     // b G2
    110.0,    // c A2
    116.54,   // d Bb2
    130.81,   // e C3
    146.83,   // f D3
    164.81,   // g E3
    174.61,   // h F3
    196.0,    // i G3
    220.0,    // j A3
    233.08,   // k Bb3
    261.63,   // l C4
    293.66,   // m D4
    329.63,   // n E4
    349.23,   // o F4
    392.0,    // p G4
    440.0,    // q A4
    466.16,   // r Bb4
    523.25,   // s C5
    587.33,   // t D5
    659.26,   // u E5
    698.46,   // v F5
    783.99,   // w G5
    880.0,    // x A5
    932.33,   // y Bb5
    1046.5,   // z C6
];

// ── Palettes ────────────────────────────────────────────────

/// Curated to read well on a dark background.
pub static ETHEREAL_PALETTE: Palette = [
    "#FF6B6B", // a
    "#4ECDC4", // b
    "#45B7D1", // c
    "#96CEB4", // d
    "#FFEAA7", // e
    "#DDA0DD", // f
    "#98D8C8", // g
    "#F7DC6F", // h
    "#BB8FCE", // i
    "#85C1E9", // j
    "#F8C471", // k
    "#82E0AA", // l
    "#F1948A", // m
    "#85929E", // n
    "#F0B27A", // o
    "#AED6F1", // p
    "#A3E4D7", // q
    "#E59866", // r
    "#C39BD3", // s
    "#7FB3D8", // t
    "#F9E79F", // u
    "#A2D9CE", // v
    "#D7BDE2", // w
    "#F5B7B1", // x
    "#AEB6BF", // y
    "#A9DFBF", // z
];

pub static PIANO_PALETTE: Palette = [
    "#D3C4B5", // a
    "#E2DACF", // b
    "#F1EEE8", // c
    "#D3CCB5", // d
    "#E2D9CF", // e
    "#F1EEE8", // f
    "#D3CAB5", // g
    "#E2DECF", // h
    "#F1EDE8", // i
    "#D3C8B5", // j
    "#E2DDCF", // k
    "#F1F0E8", // l
    "#D3C6B5", // m
    "#E2DBCF", // n
    "#F1EFE8", // o
    "#D3C4B5", // p
    "#E2DACF", // q
    "#F1EEE8", // r
    "#D3CCB5", // s
    "#E2D9CF", // t
    "#F1EEE8", // u
    "#D3CAB5", // v
    "#E2DECF", // w
    "#F1EDE8", // x
    "#D3C8B5", // y
    "#E2DDCF", // z
];

pub static OCEAN_PALETTE: Palette = [
    "#35D4B9", // a
    "#56CDDB", // b
    "#78BAE2", // c
    "#356ED4", // d
    "#56DBCF", // e
    "#78CFE2", // f
    "#358CD4", // g
    "#567CDB", // h
    "#78E2E1", // i
    "#35ABD4", // j
    "#5695DB", // k
    "#788EE2", // l
    "#35C9D4", // m
    "#56AFDB", // n
    "#78A2E2", // o
    "#35D4BF", // p
    "#56C8DB", // q
    "#78B6E2", // r
    "#3568D4", // s
    "#56DBD4", // t
    "#78CBE2", // u
    "#3586D4", // v
    "#5676DB", // w
    "#78DFE2", // x
    "#35A5D4", // y
    "#5690DB", // z
];

pub static EIGHT_BIT_PALETTE: Palette = [
    "#DD1111", // a
    "#75ED2A", // b
    "#50CBF0", // c
    "#BE11DD", // d
    "#ED842A", // e
    "#50F05C", // f
    "#1150DD", // g
    "#ED2AB1", // h
    "#F0E450", // i
    "#11DD7F", // j
    "#482AED", // k
    "#F05075", // l
    "#8FDD11", // m
    "#2AEDED", // n
    "#B350F0", // o
    "#DD4011", // p
    "#48ED2A", // q
    "#50A6F0", // r
    "#DD11CE", // s
    "#EDB12A", // t
    "#50F081", // u
    "#1121DD", // v
    "#ED2A84", // w
    "#D8F050", // x
    "#11DDAE", // y
    "#752AED", // z
];

pub static CRYSTAL_PALETTE: Palette = [
    "#94E4E4", // a
    "#B5D1EC", // b
    "#D6D6F4", // c
    "#BB94E4", // d
    "#B5E4EC", // e
    "#D6E1F4", // f
    "#9F94E4", // g
    "#D7B5EC", // h
    "#D6ECF4", // i
    "#94A6E4", // j
    "#C4B5EC", // k
    "#EDD6F4", // l
    "#94C2E4", // m
    "#B5BAEC", // n
    "#E2D6F4", // o
    "#94DEE4", // p
    "#B5CDEC", // q
    "#D7D6F4", // r
    "#C094E4", // s
    "#B5E0EC", // t
    "#D6DFF4", // u
    "#A494E4", // v
    "#DBB5EC", // w
    "#D6EAF4", // x
    "#94A1E4", // y
    "#C8B5EC", // z
];

pub static JAZZ_PALETTE: Palette = [
    "#CB5B23", // a
    "#DC873B", // b
    "#E2AE5E", // c
    "#CB9F23", // d
    "#DC773B", // e
    "#E2A15E", // f
    "#CB8F23", // g
    "#DCB83B", // h
    "#E2945E", // i
    "#CB7F23", // j
    "#DCA93B", // k
    "#E2CA5E", // l
    "#CB6F23", // m
    "#DC993B", // n
    "#E2BD5E", // o
    "#CB5F23", // p
    "#DC8A3B", // q
    "#E2B05E", // r
    "#CBA223", // s
    "#DC7A3B", // t
    "#E2A45E", // u
    "#CB9223", // v
    "#DCBB3B", // w
    "#E2975E", // x
    "#CB8223", // y
    "#DCAC3B", // z
];

pub static FIRE_PALETTE: Palette = [
    "#E90505", // a
    "#F94B1F", // b
    "#FA8F47", // c
    "#E98F05", // d
    "#F92B1F", // e
    "#FA7547", // f
    "#E96F05", // g
    "#F9AF1F", // h
    "#FA5B47", // i
    "#E94E05", // j
    "#F9901F", // k
    "#FAC847", // l
    "#E92D05", // m
    "#F9701F", // n
    "#FAAE47", // o
    "#E90C05", // p
    "#F9511F", // q
    "#FA9447", // r
    "#E99605", // s
    "#F9321F", // t
    "#FA7A47", // u
    "#E97505", // v
    "#F9B61F", // w
    "#FA6047", // x
    "#E95405", // y
    "#F9961F", // z
];

pub static LOVE_PALETTE: Palette = [
    "#E85EBA", // a
    "#ED82B6", // b
    "#F2A5BD", // c
    "#E85E70", // d
    "#ED82C3", // e
    "#F2A5C7", // f
    "#E85E81", // g
    "#ED828A", // h
    "#F2A5D0", // i
    "#E85E93", // j
    "#ED8298", // k
    "#F2A5A7", // l
    "#E85EA4", // m
    "#ED82A5", // n
    "#F2A5B1", // o
    "#E85EB6", // p
    "#ED82B3", // q
    "#F2A5BB", // r
    "#E85E6C", // s
    "#ED82C1", // t
    "#F2A5C5", // u
    "#E85E7E", // v
    "#ED8287", // w
    "#F2A5CE", // x
    "#E85E8F", // y
    "#ED8295", // z
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_complete_and_positive() {
        for mode in Mode::ALL {
            assert_eq!(mode.scale().len(), LETTERS);
            assert_eq!(mode.palette().len(), LETTERS);
            assert!(
                mode.scale().iter().all(|&f| f > 0.0),
                "{mode} has a non-positive frequency"
            );
            assert!(
                mode.palette().iter().all(|c| c.len() == 7 && c.starts_with('#')),
                "{mode} has a malformed colour"
            );
        }
    }

    #[test]
    fn lookup_ignores_case() {
        for mode in Mode::ALL {
            assert_eq!(lookup(mode, 'Q'), lookup(mode, 'q'));
            assert_eq!(get_color('A', mode), get_color('a', mode));
        }
    }

    #[test]
    fn non_letters_fall_back() {
        for mode in Mode::ALL {
            assert_eq!(lookup(mode, '5'), (440.0, "#ffffff"));
            assert_eq!(lookup(mode, ' '), (FALLBACK_FREQUENCY, FALLBACK_COLOR));
            assert_eq!(get_color('é', mode), FALLBACK_COLOR);
        }
    }

    #[test]
    fn ethereal_matches_pentatonic_layout() {
        assert_eq!(lookup(Mode::Ethereal, 'a'), (130.81, "#FF6B6B"));
        assert_eq!(frequency(Mode::Ethereal, 'j'), 440.0);
        assert_eq!(frequency(Mode::Ethereal, 'u'), 65.41);
        // C5 appears twice.
        assert_eq!(frequency(Mode::Ethereal, 'k'), frequency(Mode::Ethereal, 'z'));
        assert_eq!(get_color('z', Mode::Ethereal), "#A9DFBF");
    }

    #[test]
    fn letter_positions() {
        assert_eq!(letter_index('a'), Some(0));
        assert_eq!(letter_index('Z'), Some(25));
        assert_eq!(letter_index('['), None);
        assert_eq!(letter_index('`'), None);
        assert_eq!(letter_index('ß'), None);
    }

    #[test]
    fn vowels() {
        let found: String = ('a'..='z').filter(|&c| is_vowel(c)).collect();
        assert_eq!(found, "aeiou");
        assert!(is_vowel('E'));
        assert!(!is_vowel('y'));
        assert!(!is_vowel('5'));
    }
}
