#![forbid(unsafe_code)]

//! Viewport storm generator and replay.
//!
//! Generates deterministic sequences of timed viewport events (resizes and
//! rotations) and replays them against a [`VirtualEnvironment`]. Used to
//! check that a debounced engine does exactly one recomputation per burst and
//! always settles on the decision for the final viewport.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_viewport","idx":0,"action":"resize","width":412,"height":915,"delay_ms":10}
//! {"event":"storm_viewport","idx":1,"action":"rotate","width":915,"height":412,"delay_ms":30}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let storm = ViewportStorm::new(
//!     StormConfig::default()
//!         .with_seed(42)
//!         .with_pattern(StormPattern::Burst { count: 50 }),
//! );
//! storm.replay(&env);
//! env.advance_ms(100);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::viewport::Viewport;
use crate::virtual_env::VirtualEnvironment;

// ============================================================================
// Configuration
// ============================================================================

/// Shape of a generated storm.
#[derive(Debug, Clone, PartialEq)]
pub enum StormPattern {
    /// Rapid events with gaps below the minimum delay ceiling.
    Burst {
        /// Number of events.
        count: usize,
    },
    /// Events separated by at least `gap_ms`, so each one settles.
    Spaced {
        count: usize,
        gap_ms: u64,
    },
    /// Bursts broken up by occasional long pauses and rotations.
    Mixed {
        count: usize,
    },
    /// Explicit `(width, height, delay_ms)` resizes.
    Custom {
        events: Vec<(u32, u32, u64)>,
    },
}

impl StormPattern {
    /// Pattern name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Burst { .. } => "burst",
            Self::Spaced { .. } => "spaced",
            Self::Mixed { .. } => "mixed",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn event_count(&self) -> usize {
        match self {
            Self::Burst { count } | Self::Spaced { count, .. } | Self::Mixed { count } => *count,
            Self::Custom { events } => events.len(),
        }
    }
}

impl Default for StormPattern {
    fn default() -> Self {
        Self::Burst { count: 50 }
    }
}

/// Configuration for storm generation.
#[derive(Debug, Clone)]
pub struct StormConfig {
    /// Seed for deterministic generation.
    pub seed: u64,
    pub pattern: StormPattern,
    /// Viewport before the first event.
    pub initial: Viewport,
    /// Delay range between events inside a burst (ms).
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// Probability that a mixed-pattern event is a rotation.
    pub rotate_chance: f64,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pattern: StormPattern::default(),
            initial: Viewport::default(),
            min_delay_ms: 1,
            max_delay_ms: 40,
            min_width: 320,
            max_width: 2560,
            min_height: 480,
            max_height: 1440,
            rotate_chance: 0.1,
        }
    }
}

impl StormConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: StormPattern) -> Self {
        self.pattern = pattern;
        self
    }

    #[must_use]
    pub fn with_initial(mut self, viewport: Viewport) -> Self {
        self.initial = viewport;
        self
    }

    /// Set the delay range between events inside a burst.
    #[must_use]
    pub fn with_delay_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }

    #[must_use]
    pub fn with_width_range(mut self, min: u32, max: u32) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    #[must_use]
    pub fn with_rotate_chance(mut self, p: f64) -> Self {
        self.rotate_chance = p;
        self
    }
}

// ============================================================================
// Seeded RNG
// ============================================================================

/// LCG for deterministic generation.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // Numerical Recipes constants
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform in `min..max` (or `min` when the range is empty).
    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.next_range(u64::from(min), u64::from(max)) as u32
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

// ============================================================================
// Storm Event
// ============================================================================

/// What a storm event does to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StormAction {
    Resize { width: u32, height: u32 },
    Rotate,
}

impl StormAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Rotate => "rotate",
        }
    }
}

/// One timed event in a storm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StormEvent {
    pub action: StormAction,
    /// Virtual time to wait before applying the action (ms).
    pub delay_ms: u64,
    pub index: usize,
}

impl StormEvent {
    pub fn new(action: StormAction, delay_ms: u64, index: usize) -> Self {
        Self {
            action,
            delay_ms,
            index,
        }
    }

    /// One JSONL line describing the event and the viewport it produced.
    pub fn to_jsonl(&self, viewport: Viewport) -> String {
        serde_json::json!({
            "event": "storm_viewport",
            "idx": self.index,
            "action": self.action.name(),
            "width": viewport.width,
            "height": viewport.height,
            "delay_ms": self.delay_ms,
        })
        .to_string()
    }
}

// ============================================================================
// Storm Generator
// ============================================================================

/// Deterministic viewport storm.
#[derive(Debug, Clone)]
pub struct ViewportStorm {
    config: StormConfig,
    events: Vec<StormEvent>,
}

impl ViewportStorm {
    pub fn new(config: StormConfig) -> Self {
        let mut storm = Self {
            config,
            events: Vec::new(),
        };
        storm.generate_events();
        storm
    }

    pub fn events(&self) -> &[StormEvent] {
        &self.events
    }

    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    fn generate_events(&mut self) {
        let mut rng = SeededRng::new(self.config.seed);
        self.events = match &self.config.pattern {
            StormPattern::Burst { count } => self.generate_burst(&mut rng, *count),
            StormPattern::Spaced { count, gap_ms } => {
                self.generate_spaced(&mut rng, *count, *gap_ms)
            }
            StormPattern::Mixed { count } => self.generate_mixed(&mut rng, *count),
            StormPattern::Custom { events } => events
                .iter()
                .enumerate()
                .map(|(i, &(width, height, delay))| {
                    StormEvent::new(StormAction::Resize { width, height }, delay, i)
                })
                .collect(),
        };
    }

    fn random_resize(&self, rng: &mut SeededRng) -> StormAction {
        StormAction::Resize {
            width: rng.next_u32_range(self.config.min_width, self.config.max_width),
            height: rng.next_u32_range(self.config.min_height, self.config.max_height),
        }
    }

    fn generate_burst(&self, rng: &mut SeededRng, count: usize) -> Vec<StormEvent> {
        (0..count)
            .map(|i| {
                let delay = rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms);
                StormEvent::new(self.random_resize(rng), delay, i)
            })
            .collect()
    }

    fn generate_spaced(&self, rng: &mut SeededRng, count: usize, gap_ms: u64) -> Vec<StormEvent> {
        (0..count)
            .map(|i| {
                let delay = gap_ms + rng.next_range(0, self.config.max_delay_ms);
                StormEvent::new(self.random_resize(rng), delay, i)
            })
            .collect()
    }

    fn generate_mixed(&self, rng: &mut SeededRng, count: usize) -> Vec<StormEvent> {
        (0..count)
            .map(|i| {
                let delay = if rng.chance(0.15) {
                    // Pause long enough for a pending window to elapse.
                    rng.next_range(200, 1000)
                } else {
                    rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms)
                };
                let action = if rng.chance(self.config.rotate_chance) {
                    StormAction::Rotate
                } else {
                    self.random_resize(rng)
                };
                StormEvent::new(action, delay, i)
            })
            .collect()
    }

    /// Number of bursts a debouncer with `window_ms` sees in this storm.
    ///
    /// A new burst starts at the first event and at every event whose delay
    /// is at least the window.
    pub fn bursts(&self, window_ms: u64) -> usize {
        self.events
            .iter()
            .enumerate()
            .filter(|(i, e)| *i == 0 || e.delay_ms >= window_ms)
            .count()
    }

    /// Viewport after every event has been applied.
    pub fn final_viewport(&self) -> Viewport {
        self.events
            .iter()
            .fold(self.config.initial, |vp, e| apply(vp, e.action))
    }

    /// Sum of all delays.
    pub fn total_duration_ms(&self) -> u64 {
        self.events.iter().map(|e| e.delay_ms).sum()
    }

    /// Deterministic checksum of the event sequence.
    pub fn sequence_checksum(&self) -> String {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            event.hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }

    /// Drive `env` through the storm: wait each delay on the virtual clock,
    /// then apply the action. Returns one JSONL line per event.
    ///
    /// The environment's viewport is reset to the configured initial size
    /// first without dispatching an event. The last window is left pending.
    pub fn replay(&self, env: &VirtualEnvironment) -> Vec<String> {
        env.set_viewport(self.config.initial);
        let mut lines = Vec::with_capacity(self.events.len());
        for event in &self.events {
            env.advance_ms(event.delay_ms);
            match event.action {
                StormAction::Resize { width, height } => env.resize_to(width, height),
                StormAction::Rotate => env.rotate(),
            }
            lines.push(event.to_jsonl(env.viewport()));
        }
        tracing::debug!(
            target: "veil.harness",
            pattern = self.config.pattern.name(),
            seed = self.config.seed,
            events = self.events.len(),
            "storm replayed"
        );
        lines
    }
}

fn apply(viewport: Viewport, action: StormAction) -> Viewport {
    match action {
        StormAction::Resize { width, height } => Viewport::new(width, height),
        StormAction::Rotate => viewport.rotated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_pattern_generates_requested_count() {
        let storm = ViewportStorm::new(
            StormConfig::default().with_pattern(StormPattern::Burst { count: 25 }),
        );
        assert_eq!(storm.events().len(), 25);
        assert!(storm.events().iter().all(|e| e.delay_ms < 40));
        assert_eq!(storm.bursts(100), 1);
    }

    #[test]
    fn spaced_pattern_settles_between_events() {
        let storm = ViewportStorm::new(
            StormConfig::default().with_pattern(StormPattern::Spaced {
                count: 8,
                gap_ms: 150,
            }),
        );
        assert_eq!(storm.bursts(100), 8);
    }

    #[test]
    fn deterministic_with_seed() {
        let config = StormConfig::default()
            .with_seed(7)
            .with_pattern(StormPattern::Mixed { count: 40 });
        let a = ViewportStorm::new(config.clone());
        let b = ViewportStorm::new(config);
        assert_eq!(a.events(), b.events());
        assert_eq!(a.sequence_checksum(), b.sequence_checksum());
    }

    #[test]
    fn different_seeds_differ() {
        let a = ViewportStorm::new(StormConfig::default().with_seed(1));
        let b = ViewportStorm::new(StormConfig::default().with_seed(2));
        assert_ne!(a.sequence_checksum(), b.sequence_checksum());
    }

    #[test]
    fn custom_pattern_uses_given_events() {
        let storm = ViewportStorm::new(StormConfig::default().with_pattern(StormPattern::Custom {
            events: vec![(400, 800, 5), (1280, 720, 500)],
        }));
        assert_eq!(storm.events().len(), 2);
        assert_eq!(storm.total_duration_ms(), 505);
        assert_eq!(storm.bursts(100), 2);
        assert_eq!(storm.final_viewport(), Viewport::new(1280, 720));
    }

    #[test]
    fn sizes_stay_within_bounds() {
        let storm = ViewportStorm::new(
            StormConfig::default()
                .with_seed(99)
                .with_width_range(300, 600)
                .with_pattern(StormPattern::Burst { count: 200 }),
        );
        for event in storm.events() {
            if let StormAction::Resize { width, .. } = event.action {
                assert!((300..600).contains(&width), "width {width}");
            }
        }
    }

    #[test]
    fn replay_drives_environment() {
        let env = VirtualEnvironment::new();
        let storm = ViewportStorm::new(
            StormConfig::default()
                .with_seed(3)
                .with_pattern(StormPattern::Mixed { count: 30 }),
        );
        let lines = storm.replay(&env);
        assert_eq!(lines.len(), 30);
        assert_eq!(env.events_dispatched(), 30);
        assert_eq!(env.viewport(), storm.final_viewport());
        assert_eq!(env.now().as_millis() as u64, storm.total_duration_ms());

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["event"], "storm_viewport");
        assert_eq!(first["idx"], 0);
    }
}
