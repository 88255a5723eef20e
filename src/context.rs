//! The shared render context every session plays into.
//!
//! A `RenderContext` owns the render clock (frames handed to the output so
//! far) and the queue of rendered session clips waiting to sound. Each call to
//! [`RenderContext::render`] sums whatever clips overlap the block, advances
//! the clock and drops finished clips. Mixing is additive, so sessions never
//! need to coordinate with each other.
//!
//! A session arrives as a run of consecutive clips, one per rendered chunk,
//! each pinned to its own frame so the run stays on the session's timeline.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dsp::mixer::Mixer;
use crate::dsp::renderer::StereoBuffer;

/// Rendered session audio pinned to a start frame on the render clock.
#[derive(Debug, Clone)]
pub struct Clip {
    pub start_frame: u64,
    pub audio: StereoBuffer,
}

impl Clip {
    pub fn new(start_frame: u64, audio: StereoBuffer) -> Self {
        Clip { start_frame, audio }
    }

    fn end_frame(&self) -> u64 {
        self.start_frame + self.audio.frames() as u64
    }
}

struct MixState {
    clips: Vec<Clip>,
    mixer: Mixer,
}

pub struct RenderContext {
    sample_rate: u32,
    frames: AtomicU64,
    running: AtomicBool,
    late_frames: AtomicU64,
    state: Mutex<MixState>,
}

impl RenderContext {
    pub fn new(sample_rate: u32, output_gain: f64) -> Self {
        RenderContext {
            sample_rate,
            frames: AtomicU64::new(0),
            running: AtomicBool::new(false),
            late_frames: AtomicU64::new(0),
            state: Mutex::new(MixState {
                clips: Vec::new(),
                mixer: Mixer::new(output_gain),
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn current_frame(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Render clock in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame() as f64 / self.sample_rate as f64
    }

    /// Frame index for render time `seconds`.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate as f64).round().max(0.0) as u64
    }

    /// Whether an output is pulling audio. A suspended context keeps its
    /// clock frozen.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Clips queued or still sounding.
    pub fn active_clips(&self) -> usize {
        self.lock_state().clips.len()
    }

    /// Earliest start frame among queued clips.
    pub fn next_start_frame(&self) -> Option<u64> {
        self.lock_state().clips.iter().map(|c| c.start_frame).min()
    }

    /// Queued frames that were already past when they arrived and never sounded.
    pub fn late_frames(&self) -> u64 {
        self.late_frames.load(Ordering::Acquire)
    }

    /// Queue a clip. Returns `false` and drops it while the context is
    /// suspended, since nothing would ever consume it.
    ///
    /// Frames whose time has already been rendered are skipped rather than
    /// shifted, so the rest of the clip keeps its place on the timeline.
    pub fn enqueue(&self, clip: Clip) -> bool {
        if !self.is_running() {
            return false;
        }
        let mut state = self.lock_state();
        let now = self.current_frame();
        if clip.start_frame < now {
            let missed = clip.end_frame().min(now) - clip.start_frame;
            self.late_frames.fetch_add(missed, Ordering::AcqRel);
            warn!(late_frames = missed, "clip arrived after its start, skipping the part already due");
            if clip.end_frame() <= now {
                return true;
            }
        }
        state.clips.push(clip);
        true
    }

    /// Fill `out` (interleaved, `channels` wide) with the next block and
    /// advance the clock.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = out.len() / channels;

        let mut state = self.lock_state();
        let MixState { clips, mixer } = &mut *state;
        let block_start = self.current_frame();
        let block_end = block_start + frames as u64;

        mixer.clear(frames);
        for clip in clips.iter() {
            let from = clip.start_frame.max(block_start);
            let to = clip.end_frame().min(block_end);
            for pos in from..to {
                let src = (pos - clip.start_frame) as usize;
                mixer.add(
                    (pos - block_start) as usize,
                    clip.audio.left[src],
                    clip.audio.right[src],
                );
            }
        }
        mixer.write_interleaved(out, channels);

        clips.retain(|clip| clip.end_frame() > block_end);
        self.frames.store(block_end, Ordering::Release);
    }

    fn lock_state(&self) -> MutexGuard<'_, MixState> {
        self.state.lock().unwrap_or_else(|e| {
            warn!("render context mutex poisoned; continuing");
            e.into_inner()
        })
    }
}

/// Application-owned handle to the process's render context.
///
/// The context is created on the first [`SharedContext::get`] and lives
/// until the last clone of the handle is dropped.
#[derive(Clone)]
pub struct SharedContext {
    config: EngineConfig,
    cell: Arc<OnceLock<Arc<RenderContext>>>,
    #[cfg(feature = "device")]
    open_device: bool,
}

impl SharedContext {
    /// A handle whose context is driven by the caller through `render`.
    pub fn new(config: EngineConfig) -> Self {
        SharedContext {
            config,
            cell: Arc::new(OnceLock::new()),
            #[cfg(feature = "device")]
            open_device: false,
        }
    }

    /// A handle that starts the default output device on first use.
    #[cfg(feature = "device")]
    pub fn with_default_device(config: EngineConfig) -> Self {
        SharedContext {
            open_device: true,
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The rate the context runs at. A device-backed context follows the
    /// device's default rate.
    fn sample_rate(&self) -> u32 {
        #[cfg(feature = "device")]
        if self.open_device {
            return crate::device::resolve_sample_rate(self.config.sample_rate, crate::device::default_sample_rate());
        }
        self.config.sample_rate
    }

    pub fn get(&self) -> Arc<RenderContext> {
        self.cell
            .get_or_init(|| {
                let sample_rate = self.sample_rate();
                debug!(sample_rate, "creating shared render context");
                let context = Arc::new(RenderContext::new(sample_rate, self.config.output_gain));
                #[cfg(feature = "device")]
                if self.open_device {
                    crate::device::start(Arc::clone(&context));
                }
                context
            })
            .clone()
    }
}
