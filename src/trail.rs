use crate::geom::Point;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of retained trail points.
pub const TRAIL_CAP: usize = 100;
/// The whole trail is dropped and restarted after this window.
pub const TRAIL_WINDOW: Duration = Duration::from_secs(3);

/// Bounded history of an eye-corner position, kept as data for the renderer
/// to draw as a path. Points older than [`TRAIL_WINDOW`] are cleared in one
/// sweep rather than aged out individually.
#[derive(Debug, Default)]
pub struct TrailBuffer {
    points: VecDeque<Point>,
    window_started: Option<Instant>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, p: Point, now: Instant) {
        match self.window_started {
            Some(started) if now.duration_since(started) > TRAIL_WINDOW => {
                self.points.clear();
                self.window_started = Some(now);
            }
            None => self.window_started = Some(now),
            _ => {}
        }
        self.points.push_back(p);
        while self.points.len() > TRAIL_CAP {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.window_started = None;
    }
}
