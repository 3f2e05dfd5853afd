use crate::geom::Point;
use crate::session::Mode;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

/// Selection radius of a letter target, shared by placement spacing and the
/// selection engine's hit test.
pub const TARGET_RADIUS: f64 = 40.0;
/// Letters eligible as distractors.
pub const DISTRACTOR_POOL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Bound on placement rejection sampling before falling back to the
/// best sample seen so far.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    Correct,
    Wrong,
}

#[derive(Clone, Debug)]
pub struct Target {
    pub letter: char,
    pub pos: Point,
    pub state: TargetState,
}

/// One round's worth of selectable letters. `version` increments on every
/// regeneration so delayed work scheduled against an older set can detect
/// that it is stale.
#[derive(Clone, Debug, Default)]
pub struct TargetSet {
    pub targets: Vec<Target>,
    pub version: u64,
}

impl TargetSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Smallest pairwise center distance, or `None` with fewer than two
    /// targets.
    pub fn min_pairwise_distance(&self) -> Option<f64> {
        self.targets
            .iter()
            .map(|t| t.pos)
            .tuple_combinations()
            .map(|(a, b)| a.distance_to(b))
            .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.min(d))))
    }

    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.targets.iter().map(|t| t.letter)
    }
}

/// Dimensions of the area targets may occupy.
#[derive(Clone, Copy, Debug)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

pub struct TargetSetGenerator {
    area: PlayArea,
    radius: f64,
    next_version: u64,
}

impl TargetSetGenerator {
    pub fn new(area: PlayArea, radius: f64) -> Self {
        Self {
            area,
            radius,
            next_version: 0,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    /// Produce a fresh set for the given mode: the correct letter plus, in
    /// memory/speed modes, four unique distractors, order shuffled and each
    /// placed at least `2 × radius` from the others.
    pub fn generate(&mut self, mode: Mode, correct: char, rng: &mut impl Rng) -> TargetSet {
        let mut letters = vec![correct];
        let pool = DISTRACTOR_POOL.as_bytes();
        while letters.len() < mode.target_count() {
            let candidate = pool[rng.gen_range(0..pool.len())] as char;
            if !letters.contains(&candidate) {
                letters.push(candidate);
            }
        }
        letters.shuffle(rng);

        let mut placed: Vec<Point> = Vec::with_capacity(letters.len());
        for _ in 0..letters.len() {
            let pos = self.place(&placed, rng);
            placed.push(pos);
        }

        self.next_version += 1;
        TargetSet {
            targets: letters
                .into_iter()
                .zip(placed)
                .map(|(letter, pos)| Target {
                    letter,
                    pos,
                    state: TargetState::Pending,
                })
                .collect(),
            version: self.next_version,
        }
    }

    /// Rejection-sample a position inside the inset play area until it
    /// clears every already-placed target by `2 × radius`. Attempts are
    /// bounded; on exhaustion the sample furthest from its nearest
    /// neighbour wins, so generation always terminates.
    fn place(&self, placed: &[Point], rng: &mut impl Rng) -> Point {
        let margin = self.radius * 2.0;
        let mut best: Option<(Point, f64)> = None;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = Point::new(
                rng.gen_range(margin..self.area.width - margin),
                rng.gen_range(margin..self.area.height - margin),
            );
            let nearest = placed
                .iter()
                .map(|p| p.distance_to(candidate))
                .fold(f64::INFINITY, f64::min);
            if nearest >= self.radius * 2.0 {
                return candidate;
            }
            if best.map_or(true, |(_, d)| nearest > d) {
                best = Some((candidate, nearest));
            }
        }

        best.map(|(p, _)| p)
            .unwrap_or_else(|| Point::new(self.area.width / 2.0, self.area.height / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> TargetSetGenerator {
        TargetSetGenerator::new(
            PlayArea {
                width: 640.0,
                height: 480.0,
            },
            TARGET_RADIUS,
        )
    }

    #[test]
    fn test_practice_has_single_correct_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = generator().generate(Mode::Practice, 'T', &mut rng);
        assert_eq!(set.len(), 1);
        assert_eq!(set.targets[0].letter, 'T');
        assert_eq!(set.targets[0].state, TargetState::Pending);
    }

    #[test]
    fn test_memory_has_five_unique_letters_including_correct() {
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = generator().generate(Mode::Memory, 'K', &mut rng);
            assert_eq!(set.len(), 5);
            let letters: Vec<char> = set.letters().collect();
            assert_eq!(letters.iter().filter(|&&c| c == 'K').count(), 1);
            let mut dedup = letters.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), 5, "duplicate letter in {:?}", letters);
        }
    }

    #[test]
    fn test_pairwise_spacing_holds() {
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = generator().generate(Mode::Speed, 'E', &mut rng);
            let min = set.min_pairwise_distance().unwrap();
            assert!(
                min >= TARGET_RADIUS * 2.0,
                "seed {}: min pairwise distance {} below {}",
                seed,
                min,
                TARGET_RADIUS * 2.0
            );
        }
    }

    #[test]
    fn test_positions_respect_inset_margin() {
        let margin = TARGET_RADIUS * 2.0;
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = generator().generate(Mode::Memory, 'C', &mut rng);
            for t in &set.targets {
                assert!(t.pos.x >= margin && t.pos.x <= 640.0 - margin);
                assert!(t.pos.y >= margin && t.pos.y <= 480.0 - margin);
            }
        }
    }

    #[test]
    fn test_versions_increase() {
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(3);
        let a = gen.generate(Mode::Practice, 'A', &mut rng);
        let b = gen.generate(Mode::Practice, 'A', &mut rng);
        assert!(b.version > a.version);
    }

    #[test]
    fn test_cramped_area_still_terminates() {
        // Too small to honour spacing for five targets; the best-effort
        // fallback must still yield a full set.
        let mut gen = TargetSetGenerator::new(
            PlayArea {
                width: 400.0,
                height: 330.0,
            },
            TARGET_RADIUS,
        );
        let mut rng = StdRng::seed_from_u64(4);
        let set = gen.generate(Mode::Memory, 'Z', &mut rng);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_min_pairwise_distance_none_for_single() {
        let mut gen = generator();
        let mut rng = StdRng::seed_from_u64(5);
        let set = gen.generate(Mode::Practice, 'Q', &mut rng);
        assert!(set.min_pairwise_distance().is_none());
    }
}
