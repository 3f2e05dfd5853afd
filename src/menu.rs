use crate::dwell::{DwellEvent, DwellTracker, MENU_DWELL_MS};
use crate::geom::{Point, Rect};
use crate::session::Mode;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

pub const MODE_BUTTON_W: f64 = 120.0;
pub const MODE_BUTTON_H: f64 = 40.0;
pub const MODE_BUTTON_MARGIN: f64 = 10.0;
pub const OVERLAY_ITEM_W: f64 = 160.0;
pub const OVERLAY_ITEM_H: f64 = 40.0;

/// State-machine transition requested by a menu item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Start(Mode),
    Restart,
    Home,
}

#[derive(Clone, Debug)]
pub struct MenuItem {
    pub label: String,
    pub bounds: Rect,
    pub action: MenuAction,
}

/// Dwell-driven menu: the same hover-timer mechanic as letter targets, with
/// a longer threshold, applied to static items. Items occupy fixed layout
/// slots; [`shuffle`] re-deals the (label, action) pairs across those slots
/// each time the menu opens, so which slot triggers which action is
/// randomized while the slot geometry stays put.
///
/// [`shuffle`]: MenuDwellController::shuffle
pub struct MenuDwellController {
    items: Vec<MenuItem>,
    dwell: DwellTracker,
}

impl MenuDwellController {
    pub fn new(items: Vec<MenuItem>, dwell_threshold: Duration) -> Self {
        Self {
            items,
            dwell: DwellTracker::new(dwell_threshold),
        }
    }

    /// The three stacked mode buttons at canvas center.
    pub fn main_menu(width: f64, height: f64) -> Self {
        let x = width / 2.0 - MODE_BUTTON_W / 2.0;
        let items = [Mode::Practice, Mode::Memory, Mode::Speed]
            .into_iter()
            .enumerate()
            .map(|(index, mode)| {
                let y = height / 2.0 - MODE_BUTTON_H / 2.0
                    + index as f64 * (MODE_BUTTON_H + MODE_BUTTON_MARGIN);
                MenuItem {
                    label: mode.to_string(),
                    bounds: Rect::new(x, y, MODE_BUTTON_W, MODE_BUTTON_H),
                    action: MenuAction::Start(mode),
                }
            })
            .collect();
        Self::new(items, Duration::from_millis(MENU_DWELL_MS))
    }

    /// Restart/home items shown on the pause overlay and the end screen.
    pub fn overlay(width: f64, height: f64) -> Self {
        let x = width / 2.0 - OVERLAY_ITEM_W / 2.0;
        let items = vec![
            MenuItem {
                label: "Restart".to_string(),
                bounds: Rect::new(x, height / 2.0 - 30.0, OVERLAY_ITEM_W, OVERLAY_ITEM_H),
                action: MenuAction::Restart,
            },
            MenuItem {
                label: "Home".to_string(),
                bounds: Rect::new(x, height / 2.0 + 30.0, OVERLAY_ITEM_W, OVERLAY_ITEM_H),
                action: MenuAction::Home,
            },
        ];
        Self::new(items, Duration::from_millis(MENU_DWELL_MS))
    }

    /// Replace the dwell threshold, dropping any accumulated dwell.
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.dwell = DwellTracker::new(threshold);
        self
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Re-deal (label, action) pairs across the fixed bounds slots and drop
    /// any accumulated dwell. Called whenever the menu becomes visible.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        let bounds: Vec<Rect> = self.items.iter().map(|i| i.bounds).collect();
        self.items.shuffle(rng);
        for (item, b) in self.items.iter_mut().zip(bounds) {
            item.bounds = b;
        }
        self.dwell.clear_all();
    }

    /// Advance dwell state for every item; returns a confirmed action at
    /// most once, clearing all dwell state when it does.
    pub fn tick(&mut self, pointer: Option<Point>, now: Instant) -> Option<MenuAction> {
        for (index, item) in self.items.iter().enumerate() {
            let inside = pointer.map_or(false, |p| item.bounds.contains(p));
            if self.dwell.update(index, inside, now) == DwellEvent::Confirmed {
                let action = item.action;
                self.dwell.clear_all();
                return Some(action);
            }
        }
        None
    }

    /// Immediate click confirmation, bypassing dwell.
    pub fn hit(&self, pos: Point) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.bounds.contains(pos))
            .map(|item| item.action)
    }

    pub fn dwell_progress(&self, index: usize, now: Instant) -> f64 {
        self.dwell.progress(index, now)
    }

    pub fn is_hovered(&self, index: usize) -> bool {
        self.dwell.is_active(index)
    }

    pub fn clear_dwell(&mut self) {
        self.dwell.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_main_menu_layout() {
        let menu = MenuDwellController::main_menu(640.0, 480.0);
        assert_eq!(menu.items().len(), 3);
        let first = &menu.items()[0];
        assert_eq!(first.bounds.x, 260.0);
        assert_eq!(first.bounds.y, 220.0);
        // Buttons stack downward without overlapping
        assert_eq!(menu.items()[1].bounds.y, 270.0);
        assert_eq!(menu.items()[2].bounds.y, 320.0);
    }

    #[test]
    fn test_dwell_confirms_after_menu_threshold() {
        let mut menu = MenuDwellController::overlay(640.0, 480.0);
        let pos = menu.items()[0].bounds.center();
        let action = menu.items()[0].action;
        let t0 = Instant::now();

        assert_eq!(menu.tick(Some(pos), t0), None);
        assert_eq!(menu.tick(Some(pos), t0 + ms(1999)), None);
        assert_eq!(menu.tick(Some(pos), t0 + ms(2000)), Some(action));
    }

    #[test]
    fn test_confirmation_fires_once() {
        let mut menu = MenuDwellController::overlay(640.0, 480.0);
        let pos = menu.items()[0].bounds.center();
        let t0 = Instant::now();

        menu.tick(Some(pos), t0);
        assert!(menu.tick(Some(pos), t0 + ms(2000)).is_some());
        // Dwell state was cleared; the very next tick starts over
        assert_eq!(menu.tick(Some(pos), t0 + ms(2001)), None);
        assert_eq!(menu.tick(Some(pos), t0 + ms(4000)), None);
        assert!(menu.tick(Some(pos), t0 + ms(4001)).is_some());
    }

    #[test]
    fn test_no_face_resets_menu_dwell() {
        let mut menu = MenuDwellController::main_menu(640.0, 480.0);
        let pos = menu.items()[1].bounds.center();
        let t0 = Instant::now();

        menu.tick(Some(pos), t0);
        menu.tick(None, t0 + ms(1000));
        assert_eq!(menu.tick(Some(pos), t0 + ms(2500)), None);
    }

    #[test]
    fn test_click_hits_item_immediately() {
        let menu = MenuDwellController::main_menu(640.0, 480.0);
        let item = &menu.items()[2];
        assert_eq!(menu.hit(item.bounds.center()), Some(item.action));
        assert_eq!(menu.hit(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_shuffle_keeps_slots_permutes_actions() {
        let mut menu = MenuDwellController::main_menu(640.0, 480.0);
        let slots: Vec<Rect> = menu.items().iter().map(|i| i.bounds).collect();
        let mut rng = StdRng::seed_from_u64(42);

        menu.shuffle(&mut rng);

        let new_slots: Vec<Rect> = menu.items().iter().map(|i| i.bounds).collect();
        assert_eq!(slots, new_slots, "slot geometry must stay fixed");

        let mut actions: Vec<MenuAction> = menu.items().iter().map(|i| i.action).collect();
        actions.sort_by_key(|a| match a {
            MenuAction::Start(Mode::Practice) => 0,
            MenuAction::Start(Mode::Memory) => 1,
            MenuAction::Start(Mode::Speed) => 2,
            MenuAction::Restart => 3,
            MenuAction::Home => 4,
        });
        assert_eq!(
            actions,
            vec![
                MenuAction::Start(Mode::Practice),
                MenuAction::Start(Mode::Memory),
                MenuAction::Start(Mode::Speed),
            ]
        );
    }

    #[test]
    fn test_shuffle_clears_dwell() {
        let mut menu = MenuDwellController::overlay(640.0, 480.0);
        let pos = menu.items()[0].bounds.center();
        let t0 = Instant::now();
        menu.tick(Some(pos), t0);
        assert!(menu.is_hovered(0));

        let mut rng = StdRng::seed_from_u64(1);
        menu.shuffle(&mut rng);
        assert!(!menu.is_hovered(0));
    }
}
