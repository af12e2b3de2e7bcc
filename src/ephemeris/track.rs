use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::{EphemerisSource, Frame, Observer};
use crate::error::{EphemerisError, Result};
use crate::time::SimClock;

/// Reference trajectory read straight from an ephemeris source.
///
/// Mirrors the stepping surface of [`crate::sim::NBodySim`] so the two can be
/// advanced side by side: the integrated solution drifts, the track does not.
pub struct EphemerisTrack<'a, S: EphemerisSource + ?Sized> {
    source: &'a S,
    clock: SimClock,
    frame: Frame,
    observer: Observer,
    ids: Vec<i32>,
}

impl<'a, S: EphemerisSource + ?Sized> EphemerisTrack<'a, S> {
    pub fn new(source: &'a S, start: DateTime<Utc>, frame: Frame, observer: Observer) -> Self {
        Self {
            source,
            clock: SimClock::new(start),
            frame,
            observer,
            ids: Vec::new(),
        }
    }

    /// Follow another body; returns its index within the track.
    pub fn add(&mut self, id: i32) -> usize {
        self.ids.push(id);
        self.ids.len() - 1
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Advance the track's clock; nothing is integrated.
    pub fn step(&mut self, seconds: f64) -> Result<()> {
        self.clock.advance(seconds)
    }

    /// Positions of every followed body at the current time.
    pub fn positions(&self) -> Result<Vec<Vector3<f64>>, EphemerisError> {
        let now = self.clock.now();
        self.ids
            .iter()
            .map(|&id| self.source.position(id, now, self.frame, self.observer))
            .collect()
    }

    /// Velocities of every followed body at the current time.
    pub fn velocities(&self) -> Result<Vec<Vector3<f64>>, EphemerisError> {
        let now = self.clock.now();
        self.ids
            .iter()
            .map(|&id| self.source.velocity(id, now, self.frame, self.observer))
            .collect()
    }
}
