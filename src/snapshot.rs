use crate::game::GameState;
use crate::geom::{Point, Rect};
use crate::menu::MenuAction;
use crate::session::Mode;
use crate::targets::TargetState;

/// One letter target as the renderer sees it.
#[derive(Clone, Debug)]
pub struct TargetView {
    pub letter: char,
    pub pos: Point,
    pub state: TargetState,
    /// Fraction of the dwell threshold accumulated, `0.0..=1.0`.
    pub dwell_progress: f64,
}

/// One menu item as the renderer sees it.
#[derive(Clone, Debug)]
pub struct MenuItemView {
    pub label: String,
    pub bounds: Rect,
    pub action: MenuAction,
    pub hovered: bool,
    pub dwell_progress: f64,
}

/// Read-only per-tick view of the whole game, handed to the rendering
/// collaborator. The core never draws; this struct is the entire contract
/// between game state and presentation.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub state: GameState,
    pub mode: Option<Mode>,
    /// Live targets; empty outside of `Playing`.
    pub targets: Vec<TargetView>,
    pub collected: Vec<char>,
    pub word_len: usize,
    pub score: u32,
    /// Meaningful once `state` is `Finished`.
    pub success: bool,
    /// Countdown display, present only in speed mode.
    pub remaining_secs: Option<u32>,
    /// Items of whichever menu the current state shows; empty in `Playing`.
    pub menu: Vec<MenuItemView>,
    /// Pointer position; canvas center when no face is visible.
    pub cursor: Point,
    pub face_visible: bool,
    pub left_trail: Vec<Point>,
    pub right_trail: Vec<Point>,
}
