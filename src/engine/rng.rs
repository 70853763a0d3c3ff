use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

/// Source of every random decision the engine makes.
pub trait Chance {
    /// Uniform roll in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Uniform draw in `[0, 1)`.
    fn draw(&mut self) -> f64;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.draw() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        let idx = (self.draw() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl Chance for StdRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.gen_range(1..=sides.max(1))
    }

    fn draw(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

/// Replays queued dice faces and draws, for reproducible tests and demos.
///
/// When a queue runs dry the source falls back to the quietest outcome: dice
/// show 1 and draws return 0.999, so no percentage check succeeds by accident.
#[derive(Debug, Default, Clone)]
pub struct ScriptedChance {
    dice: VecDeque<u32>,
    draws: VecDeque<f64>,
}

impl ScriptedChance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dice(mut self, faces: impl IntoIterator<Item = u32>) -> Self {
        self.dice.extend(faces);
        self
    }

    pub fn with_draws(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.draws.extend(draws);
        self
    }

    pub fn push_die(&mut self, face: u32) {
        self.dice.push_back(face);
    }

    pub fn push_draw(&mut self, draw: f64) {
        self.draws.push_back(draw);
    }
}

impl Chance for ScriptedChance {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.dice.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }

    fn draw(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(0.999).clamp(0.0, 0.999_999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn scripted_replays_then_defaults() {
        let mut c = ScriptedChance::new().with_dice([4, 9]).with_draws([0.1]);
        assert_eq!(c.roll_die(6), 4);
        // clamped to the die size
        assert_eq!(c.roll_die(6), 6);
        assert_eq!(c.roll_die(6), 1);
        assert!(c.chance(0.5));
        assert!(!c.chance(0.5));
    }

    #[test]
    fn pick_stays_in_range() {
        let mut c = ScriptedChance::new().with_draws([0.0, 0.5, 0.999]);
        assert_eq!(c.pick(4), 0);
        assert_eq!(c.pick(4), 2);
        assert_eq!(c.pick(4), 3);
    }

    #[test]
    fn std_rng_rolls_within_faces() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let r = rng.roll_die(8);
            assert!((1..=8).contains(&r));
        }
    }
}
