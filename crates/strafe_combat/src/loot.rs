//! Drop tables rolled when an enemy dies

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chance to drop one of a list of pickups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTable {
    /// Probability in `[0, 1]`
    pub chance: f32,
    /// Pickup ids, one chosen uniformly on a successful roll
    pub items: Vec<String>,
}

impl DropTable {
    pub fn new<I, S>(chance: f32, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chance,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() || self.chance <= 0.0
    }

    /// Roll once. A chance of 0 never drops, 1 always drops.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.items.is_empty() {
            return None;
        }
        if rng.gen::<f32>() >= self.chance {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        Some(self.items[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_never_and_always() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let never = DropTable::new(0.0, ["health_small"]);
        let always = DropTable::new(1.0, ["health_small", "ammo_rifle"]);

        for _ in 0..100 {
            assert_eq!(never.roll(&mut rng), None);
            assert!(always.roll(&mut rng).is_some());
        }
    }

    #[test]
    fn test_empty_table_drops_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(DropTable::new(1.0, Vec::<String>::new()).roll(&mut rng), None);
        assert!(DropTable::default().is_empty());
    }

    #[test]
    fn test_rolls_are_reproducible() {
        let table = DropTable::new(0.5, ["a", "b", "c"]);
        let mut first = ChaCha8Rng::seed_from_u64(9);
        let mut second = ChaCha8Rng::seed_from_u64(9);

        let a: Vec<_> = (0..20).map(|_| table.roll(&mut first).map(str::to_string)).collect();
        let b: Vec<_> = (0..20).map(|_| table.roll(&mut second).map(str::to_string)).collect();
        assert_eq!(a, b);
        assert!(a.iter().any(Option::is_some));
        assert!(a.iter().any(Option::is_none));
    }
}
