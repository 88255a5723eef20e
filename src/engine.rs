//! Playback engine: schedules a name's audio on the shared render context and
//! delivers the letter and completion notifications on tokio timers.
//!
//! Both clocks are pinned once per session by a [`SessionClock`]: the voice
//! graph is built at `render_start` on the render clock, and every
//! notification deadline is `wall_start` plus the same offset.
//!
//! Audio is streamed: the blocking render task queues each chunk as soon as it
//! is rendered, so the opening chunk lands well inside the lookahead.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;
use crate::context::{Clip, RenderContext, SharedContext};
use crate::dsp::renderer::SessionStream;
use crate::error::Error;
use crate::graph::SessionGraph;
use crate::mode::Mode;
use crate::schedule::Schedule;
use crate::session::build_graph;

/// Caller hooks for one session.
pub struct PlaybackCallbacks {
    on_letter_start: Box<dyn FnMut(usize, char) + Send>,
    on_complete: Box<dyn FnOnce() + Send>,
}

impl PlaybackCallbacks {
    /// `on_letter_start` fires once per letter with its index in the cleaned
    /// name; `on_complete` fires once after the tail.
    pub fn new(
        on_letter_start: impl FnMut(usize, char) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        PlaybackCallbacks {
            on_letter_start: Box::new(on_letter_start),
            on_complete: Box::new(on_complete),
        }
    }
}

/// One session's start, captured once on both clocks.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    /// Session start on the render clock, in seconds.
    pub render_start: f64,
    /// The same instant on the wall clock.
    pub wall_start: Instant,
}

impl SessionClock {
    pub fn capture(context: &RenderContext, lookahead: f64) -> Self {
        SessionClock {
            render_start: context.current_time() + lookahead,
            wall_start: Instant::now() + Duration::from_secs_f64(lookahead),
        }
    }

    /// Wall-clock deadline `offset` seconds into the session.
    pub fn wall_at(&self, offset: f64) -> Instant {
        self.wall_start + Duration::from_secs_f64(offset.max(0.0))
    }
}

pub struct Engine {
    context: SharedContext,
    config: EngineConfig,
    runtime: Handle,
}

impl Engine {
    /// Bind to the tokio runtime of the calling thread.
    pub fn new(context: SharedContext, config: EngineConfig) -> Result<Self, Error> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Self::with_handle(context, config, runtime)
    }

    pub fn with_handle(context: SharedContext, config: EngineConfig, runtime: Handle) -> Result<Self, Error> {
        config.validate()?;
        Ok(Engine {
            context,
            config,
            runtime,
        })
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    /// Play `name` in `mode`. Returns immediately; audio and callbacks follow
    /// asynchronously. A name with no letters is a silent no-op.
    ///
    /// Sessions are independent: calling again before an earlier session has
    /// finished overlaps the two.
    pub fn play_name(&self, name: &str, mode: Mode, callbacks: PlaybackCallbacks) {
        let Some(schedule) = Schedule::new(name, mode) else {
            debug!(mode = %mode, "name has no letters, nothing to play");
            return;
        };

        let context = self.context.get();
        if !context.is_running() {
            debug!("render context is suspended; audio waits for an output to resume it");
        }

        let clock = SessionClock::capture(&context, self.config.lookahead);
        debug!(
            mode = %mode,
            letters = schedule.events.len(),
            total_duration = schedule.total_duration,
            tail = schedule.tail,
            render_start = clock.render_start,
            "scheduling session"
        );

        let graph = build_graph(&schedule, clock.render_start, rand::random());
        self.spawn_render(context, graph);
        self.runtime.spawn(deliver_notifications(schedule, clock, callbacks));
    }

    fn spawn_render(&self, context: Arc<RenderContext>, graph: SessionGraph) {
        self.runtime.spawn_blocking(move || {
            if let Err(err) = stream_session(&context, &graph) {
                error!(mode = %graph.mode, "session render failed: {err}");
            }
        });
    }
}

/// Render `graph` chunk by chunk, queueing each chunk at its own frame.
fn stream_session(context: &RenderContext, graph: &SessionGraph) -> Result<(), Error> {
    let start = context.frame_at(graph.origin);
    let mut offset = 0;
    for chunk in SessionStream::new(graph, context.sample_rate())? {
        let chunk = chunk?;
        let frames = chunk.frames() as u64;
        if !context.enqueue(Clip::new(start + offset, chunk)) {
            warn!(mode = %graph.mode, "render context is suspended, dropping session audio");
            return Ok(());
        }
        offset += frames;
    }
    trace!(frames = offset, "session streamed");
    Ok(())
}

async fn deliver_notifications(schedule: Schedule, clock: SessionClock, callbacks: PlaybackCallbacks) {
    let PlaybackCallbacks {
        mut on_letter_start,
        on_complete,
    } = callbacks;

    for event in &schedule.events {
        sleep_until(clock.wall_at(event.onset)).await;
        on_letter_start(event.index, event.letter);
    }

    sleep_until(clock.wall_at(schedule.complete_offset())).await;
    on_complete();
}
