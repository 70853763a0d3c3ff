use crate::engine::rng::Chance;

/// A parsed `NdM` or `NdM+K` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl Dice {
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

// Keeps a typo like "1000000d6" from stalling a turn.
const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;

pub fn parse_dice(expr: &str) -> Option<Dice> {
    let expr = expr.trim().to_ascii_lowercase();
    let (count, rest) = expr.split_once('d')?;

    let (sides, modifier) = match rest.split_once('+') {
        Some((s, m)) => (s, m.trim().parse::<i32>().ok()?),
        None => (rest, 0),
    };

    let count: u32 = count.trim().parse().ok()?;
    let sides: u32 = sides.trim().parse().ok()?;

    if count == 0 || sides == 0 || count > MAX_DICE || sides > MAX_SIDES || modifier < 0 {
        return None;
    }

    Some(Dice {
        count,
        sides,
        modifier,
    })
}

/// Roll a dice expression. Unparseable input rolls 0.
pub fn roll_dice(expr: &str, rng: &mut dyn Chance) -> i32 {
    match parse_dice(expr) {
        Some(dice) => roll(&dice, rng),
        None => {
            tracing::warn!(expr, "unparseable dice expression");
            0
        }
    }
}

pub fn roll(dice: &Dice, rng: &mut dyn Chance) -> i32 {
    let total: u32 = (0..dice.count).map(|_| rng.roll_die(dice.sides)).sum();
    total as i32 + dice.modifier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::ScriptedChance;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_common_forms() {
        assert_eq!(
            parse_dice("2d6+3"),
            Some(Dice {
                count: 2,
                sides: 6,
                modifier: 3
            })
        );
        assert_eq!(parse_dice(" 1D4 ").map(|d| d.max()), Some(4));
    }

    #[test]
    fn invalid_expressions_roll_zero() {
        let mut rng = ScriptedChance::new().with_dice([6, 6, 6]);
        for bad in ["", "d6", "2d", "abc", "0d6", "2d0", "1d6+x", "1d6-2"] {
            assert_eq!(roll_dice(bad, &mut rng), 0, "{bad}");
        }
    }

    #[test]
    fn scripted_faces_are_summed() {
        let mut rng = ScriptedChance::new().with_dice([3, 5]);
        assert_eq!(roll_dice("2d6+2", &mut rng), 10);
    }

    proptest! {
        #[test]
        fn roll_is_within_bounds(count in 1u32..6, sides in 1u32..20, modifier in 0i32..10, seed in any::<u64>()) {
            let expr = if modifier == 0 {
                format!("{count}d{sides}")
            } else {
                format!("{count}d{sides}+{modifier}")
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let r = roll_dice(&expr, &mut rng);
            prop_assert!(r >= count as i32 + modifier);
            prop_assert!(r <= (count * sides) as i32 + modifier);
        }
    }
}
