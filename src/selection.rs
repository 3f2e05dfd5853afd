use crate::dwell::{DwellEvent, DwellTracker, TARGET_DWELL_MS};
use crate::geom::Point;
use crate::session::Mode;
use crate::stats::{SelectionStat, StatsDb};
use crate::targets::{TargetSet, TargetSetGenerator, TargetState};
use chrono::Local;
use rand::Rng;
use std::time::{Duration, Instant};

/// The word the player spells, one letter per round.
pub const TARGET_WORD: [char; 11] = ['T', 'K', 'U', 'E', 'T', 'C', 'F', 'C', 'H', 'E', 'N'];

/// How long a wrong pick stays on screen before the whole set is replaced.
pub const WRONG_REPLACE_DELAY: Duration = Duration::from_millis(1000);

/// What a tick of the selection engine produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSignal {
    /// A correct letter was confirmed and the next round generated.
    Advanced,
    /// The final letter was confirmed; the word is complete.
    Completed,
    /// A wrong letter was confirmed; replacement is scheduled.
    Missed,
}

/// Replacement scheduled after a wrong pick. Carries the version of the set
/// it was scheduled against so it becomes a no-op if that set has already
/// been replaced for another reason.
#[derive(Clone, Copy, Debug)]
struct PendingReplacement {
    due: Instant,
    set_version: u64,
}

/// Drives letter selection: hit-tests the pointer against pending targets,
/// feeds the dwell tracker, applies the correct/wrong outcome policy, and
/// advances the collected sequence toward [`TARGET_WORD`].
pub struct SelectionEngine {
    word: Vec<char>,
    collected: Vec<char>,
    targets: TargetSet,
    dwell: DwellTracker,
    pending_replacement: Option<PendingReplacement>,
    round_started_at: Option<Instant>,
    stats_db: Option<StatsDb>,
}

impl SelectionEngine {
    pub fn new(stats_db: Option<StatsDb>) -> Self {
        Self::with_word(TARGET_WORD.to_vec(), Duration::from_millis(TARGET_DWELL_MS), stats_db)
    }

    pub fn with_word(word: Vec<char>, dwell_threshold: Duration, stats_db: Option<StatsDb>) -> Self {
        Self {
            word,
            collected: Vec::new(),
            targets: TargetSet::empty(),
            dwell: DwellTracker::new(dwell_threshold),
            pending_replacement: None,
            round_started_at: None,
            stats_db,
        }
    }

    pub fn word(&self) -> &[char] {
        &self.word
    }

    /// Confirmed-correct letters so far; always a prefix of the word.
    pub fn collected(&self) -> &[char] {
        &self.collected
    }

    pub fn expected_index(&self) -> usize {
        self.collected.len()
    }

    pub fn expected_letter(&self) -> Option<char> {
        self.word.get(self.collected.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.collected.len() == self.word.len()
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Dwell progress toward selection for the target at `index`.
    pub fn dwell_progress(&self, index: usize, now: Instant) -> f64 {
        self.dwell.progress(index, now)
    }

    /// Begin a fresh attempt at the word: clears progress and generates the
    /// first round's targets. A replacement still pending against the old
    /// set is left in place; the version guard makes it a no-op.
    pub fn start_round(
        &mut self,
        mode: Mode,
        now: Instant,
        generator: &mut TargetSetGenerator,
        rng: &mut impl Rng,
    ) {
        self.collected.clear();
        self.regenerate(mode, now, generator, rng);
    }

    /// Drop all round state; used when returning to the main menu.
    pub fn reset(&mut self) {
        self.collected.clear();
        self.targets = TargetSet::empty();
        self.dwell.clear_all();
        self.pending_replacement = None;
        self.round_started_at = None;
    }

    fn regenerate(
        &mut self,
        mode: Mode,
        now: Instant,
        generator: &mut TargetSetGenerator,
        rng: &mut impl Rng,
    ) {
        if let Some(correct) = self.expected_letter() {
            self.targets = generator.generate(mode, correct, rng);
            self.dwell.clear_all();
            self.round_started_at = Some(now);
        }
    }

    /// Advance one tick. `pointer` is `None` when no face was detected, in
    /// which case every target counts as not hovered and all dwell timers
    /// reset.
    pub fn tick(
        &mut self,
        pointer: Option<Point>,
        now: Instant,
        mode: Mode,
        generator: &mut TargetSetGenerator,
        rng: &mut impl Rng,
    ) -> Option<SelectionSignal> {
        if let Some(pending) = self.pending_replacement {
            if now >= pending.due {
                self.pending_replacement = None;
                if pending.set_version == self.targets.version {
                    self.regenerate(mode, now, generator, rng);
                }
            }
        }

        let radius = generator.radius();
        for index in 0..self.targets.len() {
            let target = &self.targets.targets[index];
            let hovered = target.state == TargetState::Pending
                && pointer.map_or(false, |p| p.distance_to(target.pos) < radius);
            if self.dwell.update(index, hovered, now) == DwellEvent::Confirmed
                && self.targets.targets[index].state == TargetState::Pending
            {
                return Some(self.select(index, now, mode, generator, rng));
            }
        }
        None
    }

    /// Apply the outcome policy for a confirmed target. The target leaves
    /// the `Pending` state here, which is what guards against the dwell
    /// confirmation refiring on later ticks.
    fn select(
        &mut self,
        index: usize,
        now: Instant,
        mode: Mode,
        generator: &mut TargetSetGenerator,
        rng: &mut impl Rng,
    ) -> SelectionSignal {
        self.dwell.clear(index);
        let letter = self.targets.targets[index].letter;
        let correct = self.expected_letter() == Some(letter);
        self.record_stat(letter, correct, now, mode);

        if correct {
            self.targets.targets[index].state = TargetState::Correct;
            self.collected.push(letter);
            if self.is_complete() {
                SelectionSignal::Completed
            } else {
                self.regenerate(mode, now, generator, rng);
                SelectionSignal::Advanced
            }
        } else {
            self.targets.targets[index].state = TargetState::Wrong;
            self.pending_replacement = Some(PendingReplacement {
                due: now + WRONG_REPLACE_DELAY,
                set_version: self.targets.version,
            });
            SelectionSignal::Missed
        }
    }

    fn record_stat(&self, letter: char, correct: bool, now: Instant, mode: Mode) {
        if let Some(ref db) = self.stats_db {
            let time_to_select_ms = self
                .round_started_at
                .map(|t| now.duration_since(t).as_millis() as u64)
                .unwrap_or(0);
            let _ = db.record_selection(&SelectionStat {
                letter,
                time_to_select_ms,
                was_correct: correct,
                mode: mode.to_string(),
                timestamp: Local::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{PlayArea, TARGET_RADIUS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn generator() -> TargetSetGenerator {
        TargetSetGenerator::new(
            PlayArea {
                width: 640.0,
                height: 480.0,
            },
            TARGET_RADIUS,
        )
    }

    fn engine() -> SelectionEngine {
        SelectionEngine::new(None)
    }

    fn target_pos(engine: &SelectionEngine, letter: char) -> Point {
        engine
            .targets()
            .targets
            .iter()
            .find(|t| t.letter == letter)
            .map(|t| t.pos)
            .expect("letter not in target set")
    }

    fn other_pos(engine: &SelectionEngine, not: char) -> Point {
        engine
            .targets()
            .targets
            .iter()
            .find(|t| t.letter != not)
            .map(|t| t.pos)
            .expect("no distractor in target set")
    }

    /// Hold the pointer on `pos` long enough to confirm a selection.
    fn dwell_select(
        engine: &mut SelectionEngine,
        pos: Point,
        t0: Instant,
        mode: Mode,
        gen: &mut TargetSetGenerator,
        rng: &mut StdRng,
    ) -> Option<SelectionSignal> {
        assert_eq!(engine.tick(Some(pos), t0, mode, gen, rng), None);
        engine.tick(Some(pos), t0 + ms(1000), mode, gen, rng)
    }

    #[test]
    fn test_start_round_targets_expected_letter() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(7);
        engine.start_round(Mode::Memory, Instant::now(), &mut gen, &mut rng);

        assert_eq!(engine.expected_letter(), Some('T'));
        assert_eq!(
            engine.targets().letters().filter(|&c| c == 'T').count(),
            1
        );
    }

    #[test]
    fn test_correct_selection_advances_and_regenerates() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(8);
        let t0 = Instant::now();
        engine.start_round(Mode::Memory, t0, &mut gen, &mut rng);
        let first_version = engine.targets().version;

        let pos = target_pos(&engine, 'T');
        let signal = dwell_select(&mut engine, pos, t0, Mode::Memory, &mut gen, &mut rng);

        assert_eq!(signal, Some(SelectionSignal::Advanced));
        assert_eq!(engine.collected(), &['T']);
        assert_eq!(engine.expected_letter(), Some('K'));
        assert!(engine.targets().version > first_version);
    }

    #[test]
    fn test_wrong_selection_marks_and_schedules_replacement() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(9);
        let t0 = Instant::now();
        engine.start_round(Mode::Memory, t0, &mut gen, &mut rng);
        let version = engine.targets().version;

        let pos = other_pos(&engine, 'T');
        let signal = dwell_select(&mut engine, pos, t0, Mode::Memory, &mut gen, &mut rng);
        assert_eq!(signal, Some(SelectionSignal::Missed));

        // Wrong state is visible immediately; the set itself is unchanged
        assert!(engine
            .targets()
            .targets
            .iter()
            .any(|t| t.state == TargetState::Wrong));
        assert_eq!(engine.targets().version, version);
        assert_eq!(engine.expected_index(), 0);

        // After the fixed delay the whole set is replaced, same expected letter
        engine.tick(None, t0 + ms(2001), Mode::Memory, &mut gen, &mut rng);
        assert!(engine.targets().version > version);
        assert!(engine
            .targets()
            .targets
            .iter()
            .all(|t| t.state == TargetState::Pending));
        assert_eq!(engine.expected_letter(), Some('T'));
        assert_eq!(engine.expected_index(), 0);
    }

    #[test]
    fn test_stale_replacement_is_noop() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(10);
        let t0 = Instant::now();
        engine.start_round(Mode::Memory, t0, &mut gen, &mut rng);

        let pos = other_pos(&engine, 'T');
        dwell_select(&mut engine, pos, t0, Mode::Memory, &mut gen, &mut rng);

        // The set gets replaced for another reason before the delay fires
        engine.start_round(Mode::Memory, t0 + ms(1100), &mut gen, &mut rng);
        let version = engine.targets().version;

        engine.tick(None, t0 + ms(2500), Mode::Memory, &mut gen, &mut rng);
        assert_eq!(engine.targets().version, version, "stale replacement fired");
    }

    #[test]
    fn test_leaving_target_resets_dwell() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(11);
        let t0 = Instant::now();
        engine.start_round(Mode::Practice, t0, &mut gen, &mut rng);

        let pos = target_pos(&engine, 'T');
        engine.tick(Some(pos), t0, Mode::Practice, &mut gen, &mut rng);
        // One tick away (no face) clears the timer
        engine.tick(None, t0 + ms(500), Mode::Practice, &mut gen, &mut rng);
        let signal = engine.tick(Some(pos), t0 + ms(1200), Mode::Practice, &mut gen, &mut rng);
        assert_eq!(signal, None);
        assert_eq!(engine.collected(), &[] as &[char]);
    }

    #[test]
    fn test_full_word_completes() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(12);
        let mut now = Instant::now();
        engine.start_round(Mode::Practice, now, &mut gen, &mut rng);

        let mut last = None;
        for _ in 0..TARGET_WORD.len() {
            let letter = engine.expected_letter().unwrap();
            let pos = target_pos(&engine, letter);
            now += ms(10);
            assert_eq!(
                engine.tick(Some(pos), now, Mode::Practice, &mut gen, &mut rng),
                None
            );
            now += ms(1000);
            last = engine.tick(Some(pos), now, Mode::Practice, &mut gen, &mut rng);
        }

        assert_eq!(last, Some(SelectionSignal::Completed));
        assert!(engine.is_complete());
        assert_eq!(engine.collected(), &TARGET_WORD[..]);
    }

    #[test]
    fn test_collected_is_always_prefix() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(13);
        let mut now = Instant::now();
        engine.start_round(Mode::Memory, now, &mut gen, &mut rng);

        for _ in 0..4 {
            let letter = engine.expected_letter().unwrap();
            let pos = target_pos(&engine, letter);
            now += ms(10);
            engine.tick(Some(pos), now, Mode::Memory, &mut gen, &mut rng);
            now += ms(1000);
            engine.tick(Some(pos), now, Mode::Memory, &mut gen, &mut rng);

            let n = engine.expected_index();
            assert_eq!(engine.collected(), &TARGET_WORD[..n]);
        }
    }

    #[test]
    fn test_confirmed_target_does_not_refire() {
        let mut engine = engine();
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(14);
        let t0 = Instant::now();
        engine.start_round(Mode::Memory, t0, &mut gen, &mut rng);

        let pos = other_pos(&engine, 'T');
        dwell_select(&mut engine, pos, t0, Mode::Memory, &mut gen, &mut rng);

        // Holding on the now-wrong target must not select again
        let signal = engine.tick(Some(pos), t0 + ms(1500), Mode::Memory, &mut gen, &mut rng);
        assert_eq!(signal, None);
    }
}
