//! The real-time control loop
//!
//! One iteration reads an audio frame, turns it into a loudness value, then
//! for each fixture advances the hue and pushes `hsv(hue, 1, loudness)` into
//! its three channel filters.
//!
//! ```text
//!            ┌──────────┐  cancel()   ┌───────────────┐
//!  Ctrl-C ──►│ Shutdown │────────────►│    RUNNING    │──┐
//!            │  Token   │             └───────┬───────┘  │ step(dt)
//!            └──────────┘                     │ ◄────────┘
//!                             cancelled /     │
//!                             fatal error     ▼
//!                                     ┌───────────────┐
//!                                     │    STOPPED    │ fixtures → audio → backend
//!                                     └───────────────┘
//! ```
//!
//! The loop never sleeps. It is paced by [`AudioSource::read`], which blocks
//! until the capture device delivers the next buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ShowConfig;
use crate::error::{LightShowError, LightShowResult};
use crate::fixture::Fixture;
use crate::hardware::{HardwareError, OutputBackend, PwmChannel};
use crate::hue::{hsv_to_rgb, HueCycler};
use crate::loudness::LoudnessTransform;
use crate::types::{AudioFrame, NUM_FIXTURES};

/// Cooperative stop flag shared with the interrupt handler
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop before its next iteration
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Monotonic time source
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Anything the control loop can pull audio frames from
pub trait AudioSource {
    /// Replace `frame` with the samples captured since the previous read
    ///
    /// May block briefly waiting for the next buffer. An empty frame is a
    /// valid result and reads as silence.
    fn read(&mut self, frame: &mut AudioFrame);

    /// Stop capturing and release the device
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal, every resource has been released
    Stopped,
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    pub iterations: u64,
    /// Reads that returned no samples
    pub empty_reads: u64,
    /// Wall time spent inside `run`
    pub elapsed: Duration,
}

/// A fixture together with the hue it is cycling through
#[derive(Debug)]
struct FixtureSlot<C: PwmChannel> {
    hue: HueCycler,
    fixture: Fixture<C>,
}

/// Audio in, six PWM duty cycles out
pub struct ControlLoop<A: AudioSource, B: OutputBackend> {
    loudness: LoudnessTransform,
    fixtures: Vec<FixtureSlot<B::Channel>>,
    audio: A,
    backend: B,
    /// Reused between iterations
    frame: AudioFrame,
    last_loudness: f32,
    state: LoopState,
    stats: LoopStats,
}

impl<A: AudioSource, B: OutputBackend> ControlLoop<A, B> {
    /// Open every fixture on `backend` and take ownership of `audio`
    ///
    /// If a fixture fails to open, the fixtures already opened are cleaned
    /// up, `audio` is closed and `backend` released before returning.
    pub fn new(config: &ShowConfig, mut audio: A, mut backend: B) -> LightShowResult<Self> {
        let mut fixtures = Vec::with_capacity(NUM_FIXTURES);

        for fixture_config in &config.fixtures {
            let opened = Fixture::open(
                &mut backend,
                fixture_config,
                &config.channel,
                config.pwm_frequency_hz,
            );
            match opened {
                Ok(fixture) => fixtures.push(FixtureSlot {
                    hue: HueCycler::new(fixture_config.hue_frequency_deg_per_sec),
                    fixture,
                }),
                Err(e) => {
                    log::error!("[{}] Failed to open fixture: {}", fixture_config.name, e);
                    for cleanup_error in release_all(&mut fixtures, &mut audio, &mut backend) {
                        log::error!("{}", cleanup_error);
                    }
                    return Err(e.into());
                }
            }
        }

        log::info!("Control loop ready with {} fixtures", fixtures.len());

        Ok(Self {
            loudness: LoudnessTransform::new(&config.loudness),
            fixtures,
            audio,
            backend,
            frame: AudioFrame::with_capacity(1024),
            last_loudness: 0.0,
            state: LoopState::Running,
            stats: LoopStats::default(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Loudness computed by the most recent iteration
    pub fn loudness(&self) -> f32 {
        self.last_loudness
    }

    pub fn fixture(&self, index: usize) -> Option<&Fixture<B::Channel>> {
        self.fixtures.get(index).map(|slot| &slot.fixture)
    }

    /// Current hue of a fixture, fraction of a turn
    pub fn hue(&self, index: usize) -> Option<f32> {
        self.fixtures.get(index).map(|slot| slot.hue.hue())
    }

    /// Run a single iteration with `dt` elapsed since the previous one
    ///
    /// Does nothing once the loop has stopped.
    pub fn step(&mut self, dt: Duration) -> LightShowResult<()> {
        if self.state == LoopState::Stopped {
            return Ok(());
        }

        self.audio.read(&mut self.frame);
        if self.frame.is_empty() {
            self.stats.empty_reads += 1;
        }
        let loudness = self.loudness.brightness(&self.frame);
        self.last_loudness = loudness;

        for slot in &mut self.fixtures {
            slot.hue.advance(dt);
            let rgb = hsv_to_rgb(slot.hue.hue(), 1.0, loudness);
            slot.fixture.update(rgb)?;
        }

        log::trace!(
            "{} samples, loudness {:.4}, dt {:?}",
            self.frame.len(),
            loudness,
            dt
        );
        self.stats.iterations += 1;
        Ok(())
    }

    /// Iterate until `token` is cancelled or a hardware write fails
    ///
    /// Shutdown runs on every exit path. An error from the loop itself wins
    /// over cleanup errors, which are then only logged.
    pub fn run<K: Clock>(mut self, clock: &mut K, token: &ShutdownToken) -> LightShowResult<LoopStats> {
        let started = clock.now();
        let mut previous = started;
        log::info!("Light show running");

        let result = loop {
            if token.is_cancelled() {
                log::info!("Shutdown requested");
                break Ok(());
            }
            let now = clock.now();
            let dt = now.saturating_duration_since(previous);
            previous = now;

            if let Err(e) = self.step(dt) {
                log::error!("Control loop stopped: {}", e);
                break Err(e);
            }
        };

        self.stats.elapsed = clock.now().saturating_duration_since(started);
        let shutdown = self.shutdown();

        match (result, shutdown) {
            (Err(e), Err(cleanup)) => {
                log::error!("{}", cleanup);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(cleanup)) => Err(cleanup),
            (Ok(()), Ok(())) => Ok(self.stats.clone()),
        }
    }

    /// Stop every fixture, close the audio source, release the backend
    ///
    /// Each step runs even if an earlier one failed. Only the first call does
    /// anything.
    pub fn shutdown(&mut self) -> LightShowResult<()> {
        if self.state == LoopState::Stopped {
            return Ok(());
        }
        self.state = LoopState::Stopped;

        let errors = release_all(&mut self.fixtures, &mut self.audio, &mut self.backend);
        log::info!(
            "Light show stopped after {} iterations ({} empty reads, {:.1}s)",
            self.stats.iterations,
            self.stats.empty_reads,
            self.stats.elapsed.as_secs_f32()
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LightShowError::Cleanup(errors))
        }
    }
}

impl<A: AudioSource, B: OutputBackend> Drop for ControlLoop<A, B> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{}", e);
        }
    }
}

fn release_all<A: AudioSource, B: OutputBackend>(
    fixtures: &mut [FixtureSlot<B::Channel>],
    audio: &mut A,
    backend: &mut B,
) -> Vec<HardwareError> {
    let mut errors = Vec::new();
    for slot in fixtures.iter_mut() {
        if let Err(e) = slot.fixture.cleanup() {
            errors.push(e);
        }
    }
    audio.close();
    if let Err(e) = backend.release() {
        log::error!("Failed to release outputs: {}", e);
        errors.push(e);
    }
    errors
}
