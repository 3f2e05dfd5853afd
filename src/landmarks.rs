use crate::geom::Point;

// Facemesh keypoint indices for the landmarks the game consumes.
pub const NOSE_TIP_INDEX: usize = 94;
pub const LEFT_EYE_CORNER_INDEX: usize = 33;
pub const RIGHT_EYE_CORNER_INDEX: usize = 263;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    NoseTip,
    LeftEyeCorner,
    RightEyeCorner,
}

/// One frame of landmark positions in source-image space.
///
/// The camera image is mirrored when presented to the player, so hit tests
/// use [`pointer`], which flips x across the canvas width. Eye corners feed
/// the cosmetic trails and are not mirrored here; that is the renderer's
/// concern.
///
/// [`pointer`]: LandmarkFrame::pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame {
    pub nose: Point,
    pub left_eye: Point,
    pub right_eye: Point,
}

impl LandmarkFrame {
    pub fn new(nose: Point, left_eye: Point, right_eye: Point) -> Self {
        Self {
            nose,
            left_eye,
            right_eye,
        }
    }

    /// Build a frame whose mirrored pointer lands exactly on `p`. Used by
    /// the simulated input mode and by tests.
    pub fn from_canvas_pointer(p: Point, canvas_width: f64) -> Self {
        let nose = Point::new(canvas_width - p.x, p.y);
        Self {
            nose,
            left_eye: Point::new(nose.x - 20.0, nose.y - 25.0),
            right_eye: Point::new(nose.x + 20.0, nose.y - 25.0),
        }
    }

    pub fn get(&self, landmark: Landmark) -> Point {
        match landmark {
            Landmark::NoseTip => self.nose,
            Landmark::LeftEyeCorner => self.left_eye,
            Landmark::RightEyeCorner => self.right_eye,
        }
    }

    /// Nose position in canvas space, mirrored horizontally.
    pub fn pointer(&self, canvas_width: f64) -> Point {
        Point::new(canvas_width - self.nose.x, self.nose.y)
    }
}

/// Supplies one frame of landmarks per tick; `None` means no face detected.
pub trait LandmarkSource {
    fn poll(&mut self) -> Option<LandmarkFrame>;
}
