use rand::Rng;

use crate::snake::Snake;
use crate::state::Bounds;
use crate::Cell;

/// Food variants. Besides points, Fast and Slow shift the tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodKind {
    Normal,
    Bonus,
    Fast,
    Slow,
}

impl FoodKind {
    pub fn symbol(self) -> char {
        match self {
            FoodKind::Normal => '@',
            FoodKind::Bonus => '$',
            FoodKind::Fast => 'F',
            FoodKind::Slow => 'S',
        }
    }

    pub fn points(self) -> u32 {
        match self {
            FoodKind::Bonus => 3,
            _ => 1,
        }
    }

    /// Change to the tick interval when eaten, in milliseconds.
    pub fn tick_delta_ms(self) -> i64 {
        match self {
            FoodKind::Fast => -15,
            FoodKind::Slow => 20,
            _ => 0,
        }
    }

    /// Rolls a kind: 65% Normal, 15% Bonus, 10% Fast, 10% Slow.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> FoodKind {
        let r = rng.gen_range(0..100);
        if r < 65 {
            FoodKind::Normal
        } else if r < 80 {
            FoodKind::Bonus
        } else if r < 90 {
            FoodKind::Fast
        } else {
            FoodKind::Slow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub pos: Cell,
    pub kind: FoodKind,
}

impl Food {
    /// Spawns a food with a freshly rolled kind at a uniformly sampled cell
    /// not occupied by the snake or any food in `others`. Sampling is
    /// rejection-based; the board is far larger than snake + foods.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        bounds: Bounds,
        snake: &Snake,
        others: &[Food],
    ) -> Food {
        let kind = FoodKind::roll(rng);
        loop {
            let pos = bounds.random_cell(rng);
            if !snake.occupies(pos) && !others.iter().any(|f| f.pos == pos) {
                return Food { pos, kind };
            }
        }
    }
}
