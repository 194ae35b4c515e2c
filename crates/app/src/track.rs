//! Recorded location tracks, replayed as a live position source.
//!
//! A track file is a JSON array of `{"lat": .., "lng": ..}` fixes. Fixes are
//! released one at a time, at most one per `interval` polls.

use geocoin_core::{GeoPoint, PositionSource};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct TrackSource {
    fixes: VecDeque<GeoPoint>,
    interval: u32,
    countdown: u32,
}

impl TrackSource {
    pub fn new(fixes: impl IntoIterator<Item = GeoPoint>, interval: u32) -> Self {
        Self { fixes: fixes.into_iter().collect(), interval: interval.max(1), countdown: 0 }
    }

    pub fn load(path: &Path, interval: u32) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let fixes: Vec<GeoPoint> = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(bad) = fixes.iter().position(|fix| !fix.is_finite()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("track fix {bad} is not a finite coordinate"),
            ));
        }
        Ok(Self::new(fixes, interval))
    }

    pub fn remaining(&self) -> usize {
        self.fixes.len()
    }
}

impl PositionSource for TrackSource {
    fn poll(&mut self) -> Option<GeoPoint> {
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }
        let fix = self.fixes.pop_front()?;
        self.countdown = self.interval - 1;
        Some(fix)
    }
}
