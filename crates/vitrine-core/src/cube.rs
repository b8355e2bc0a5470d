//! Panel navigator that turns a ring of faces like a cube around one axis.
//!
//! The navigator only keeps the face index and the accumulated angle. The host
//! applies the angle (or any transition it likes) and flips face/dot states
//! from [`CubeNavigator::is_active`].

use std::time::{Duration, Instant};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const DEFAULT_WHEEL_THRESHOLD: f64 = 60.0; // a mouse notch is ~100, a trackpad tick ~30
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Navigator needs at least one face")]
    NoFaces,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeConfig {
    /// Wheel deltas smaller than this are ignored.
    pub wheel_threshold: f64,
    /// Minimum time between two wheel-driven turns.
    pub cooldown: Duration,
    /// Wheel down / arrow down go to the previous face instead of the next.
    pub invert: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            wheel_threshold: DEFAULT_WHEEL_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
            invert: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Heading {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub from: usize,
    pub index: usize,
    /// Signed number of faces turned; negative turns go backwards.
    pub steps: isize,
    /// Accumulated angle in degrees after this turn.
    pub angle: f64,
}

#[derive(Debug, Clone)]
pub struct CubeNavigator {
    faces: usize,
    current: usize,
    angle: f64,
    config: CubeConfig,
    cooldown_until: Option<Instant>,
}

impl CubeNavigator {
    pub fn new(faces: usize, config: CubeConfig) -> Result<Self, CubeError> {
        if faces == 0 {
            return Err(CubeError::NoFaces);
        }
        let mut navigator = Self {
            faces,
            current: 0,
            angle: 0.0,
            config,
            cooldown_until: None,
        };
        navigator.rotate_to(0);
        Ok(navigator)
    }

    pub fn faces(&self) -> usize {
        self.faces
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.current
    }

    pub fn step_degrees(&self) -> f64 {
        360.0 / self.faces as f64
    }

    /// Turns to `index` (wrapped into range) the short way round. A turn of
    /// exactly half the ring goes forwards.
    pub fn rotate_to(&mut self, index: usize) -> Rotation {
        let index = index % self.faces;
        let faces = self.faces as isize;
        let half = faces / 2;

        let mut steps = index as isize - self.current as isize;
        if steps > half {
            steps -= faces;
        }
        if steps < -half {
            steps += faces;
        }

        self.angle += steps as f64 * -self.step_degrees();
        let rotation = Rotation {
            from: self.current,
            index,
            steps,
            angle: self.angle,
        };
        self.current = index;

        log::debug!(
            "cube: face {} -> {} ({} steps, {} deg)",
            rotation.from,
            rotation.index,
            steps,
            self.angle
        );
        rotation
    }

    pub fn next(&mut self) -> Rotation {
        self.rotate_to((self.current + 1) % self.faces)
    }

    pub fn previous(&mut self) -> Rotation {
        self.rotate_to((self.current + self.faces - 1) % self.faces)
    }

    /// One turn per deliberate wheel movement. Small deltas and deltas that
    /// arrive during the cooldown of the previous turn are dropped.
    pub fn on_wheel(&mut self, delta_y: f64, now: Instant) -> Option<Rotation> {
        if delta_y.abs() < self.config.wheel_threshold {
            return None;
        }
        if self.cooldown_until.is_some_and(|until| now < until) {
            return None;
        }
        self.cooldown_until = Some(now + self.config.cooldown);

        let forward = (delta_y > 0.0) != self.config.invert;
        Some(if forward { self.next() } else { self.previous() })
    }

    pub fn on_key(&mut self, heading: Heading) -> Rotation {
        let forward = (heading == Heading::Up) == self.config.invert;
        if forward { self.next() } else { self.previous() }
    }
}
