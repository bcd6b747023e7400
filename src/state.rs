use rand::Rng;

use crate::food::{Food, FoodKind};
use crate::snake::{Direction, Snake};
use crate::Cell;

pub const FOOD_COUNT: usize = 3;
pub const START_SNAKE_LEN: usize = 3;

pub const START_TICK_MS: u64 = 180;
pub const MIN_TICK_MS: u64 = 60;
pub const MAX_TICK_MS: u64 = 300;

/// Inclusive playable rectangle, border excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i16,
    pub max_x: i16,
    pub min_y: i16,
    pub max_y: i16,
}

impl Bounds {
    pub fn contains(self, cell: Cell) -> bool {
        cell.0 >= self.min_x && cell.0 <= self.max_x && cell.1 >= self.min_y && cell.1 <= self.max_y
    }

    pub fn center(self) -> Cell {
        ((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }

    /// Uniformly sampled cell inside the bounds.
    pub fn random_cell<R: Rng + ?Sized>(self, rng: &mut R) -> Cell {
        (
            rng.gen_range(self.min_x..=self.max_x),
            rng.gen_range(self.min_y..=self.max_y),
        )
    }
}

/// Why a game ended. Every variant is an ordinary exit, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Wall,
    SelfHit,
    Resized,
    Quit,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Wall => "Game over: you ran into the wall.",
            Outcome::SelfHit => "Game over: you ran into yourself.",
            Outcome::Resized => "Terminal was resized, exiting.",
            Outcome::Quit => "Quit.",
        }
    }
}

/// What a single tick did, reported as a render diff so the screen is only
/// repainted where it changed.
pub enum TickResult {
    Moved {
        new_head: Cell,
        old_head: Cell,
        /// Tail cell vacated this tick; `None` when the snake grew.
        freed_tail: Option<Cell>,
        /// Kind that was eaten and the food that replaced it.
        eaten: Option<(FoodKind, Food)>,
    },
    Ended(Outcome),
}

pub struct GameState {
    pub bounds: Bounds,
    pub snake: Snake,
    pub foods: Vec<Food>,
    pub score: u32,
    pub highscore: u32,
    pub tick_ms: u64,
    pub outcome: Option<Outcome>,
}

impl GameState {
    /// Fresh game: a 3-segment snake heading right from the center and
    /// `FOOD_COUNT` foods on free cells. The highscore carries over between
    /// games.
    pub fn new<R: Rng + ?Sized>(bounds: Bounds, highscore: u32, rng: &mut R) -> Self {
        let snake = Snake::new(bounds.center(), START_SNAKE_LEN, Direction::Right);

        let mut foods: Vec<Food> = Vec::with_capacity(FOOD_COUNT);
        for _ in 0..FOOD_COUNT {
            let food = Food::spawn(rng, bounds, &snake, &foods);
            foods.push(food);
        }

        GameState {
            bounds,
            snake,
            foods,
            score: 0,
            highscore,
            tick_ms: START_TICK_MS,
            outcome: None,
        }
    }

    /// Advances the simulation by one tick: applies the pending direction,
    /// moves the head, resolves wall/self collisions and food pickups.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        pending: Option<Direction>,
        rng: &mut R,
    ) -> TickResult {
        if let Some(dir) = pending {
            self.snake.try_set_direction(dir);
        }

        let old_head = self.snake.head();
        let next = self.snake.next_head();

        if !self.bounds.contains(next) {
            return self.end(Outcome::Wall);
        }

        let eaten_idx = self.foods.iter().position(|f| f.pos == next);
        let ate = eaten_idx.is_some();

        // Running onto the current tail cell is fine as long as the tail
        // vacates it this very tick, i.e. the snake is not growing.
        if self.snake.occupies(next) && (ate || next != self.snake.tail()) {
            return self.end(Outcome::SelfHit);
        }

        let freed_tail = self.snake.advance(next, ate);

        let mut eaten = None;
        if let Some(idx) = eaten_idx {
            let kind = self.foods[idx].kind;

            self.score += kind.points();
            if self.score > self.highscore {
                self.highscore = self.score;
            }

            self.tick_ms = (self.tick_ms as i64 + kind.tick_delta_ms())
                .clamp(MIN_TICK_MS as i64, MAX_TICK_MS as i64) as u64;

            let respawned = Food::spawn(rng, self.bounds, &self.snake, &self.foods);
            self.foods[idx] = respawned;
            eaten = Some((kind, respawned));
        }

        TickResult::Moved { new_head: next, old_head, freed_tail, eaten }
    }

    fn end(&mut self, outcome: Outcome) -> TickResult {
        self.outcome = Some(outcome);
        TickResult::Ended(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const BOUNDS: Bounds = Bounds { min_x: 1, max_x: 20, min_y: 1, max_y: 10 };

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn state_with(snake: Snake, foods: Vec<Food>) -> GameState {
        GameState {
            bounds: BOUNDS,
            snake,
            foods,
            score: 0,
            highscore: 0,
            tick_ms: START_TICK_MS,
            outcome: None,
        }
    }

    fn far_food() -> Food {
        Food { pos: (20, 10), kind: FoodKind::Normal }
    }

    #[test]
    fn fresh_game_has_disjoint_snake_and_foods() {
        let mut rng = rng();
        let state = GameState::new(BOUNDS, 17, &mut rng);

        assert_eq!(state.snake.len(), START_SNAKE_LEN);
        assert_eq!(state.foods.len(), FOOD_COUNT);
        assert_eq!(state.score, 0);
        assert_eq!(state.highscore, 17);
        assert_eq!(state.tick_ms, START_TICK_MS);

        for (i, food) in state.foods.iter().enumerate() {
            assert!(state.bounds.contains(food.pos));
            assert!(!state.snake.occupies(food.pos));
            for other in &state.foods[i + 1..] {
                assert_ne!(food.pos, other.pos);
            }
        }
    }

    #[test]
    fn plain_move_shifts_body_by_one() {
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let mut state = state_with(snake, vec![far_food()]);

        match state.step(None, &mut rng()) {
            TickResult::Moved { new_head, old_head, freed_tail, eaten } => {
                assert_eq!(new_head, (6, 5));
                assert_eq!(old_head, (5, 5));
                assert_eq!(freed_tail, Some((3, 5)));
                assert!(eaten.is_none());
            }
            TickResult::Ended(outcome) => panic!("unexpected end: {:?}", outcome),
        }

        let body: Vec<_> = state.snake.segments().copied().collect();
        assert_eq!(body, vec![(6, 5), (5, 5), (4, 5)]);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn pending_reversal_is_ignored_for_the_tick() {
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let mut state = state_with(snake, vec![far_food()]);

        state.step(Some(Direction::Left), &mut rng());

        assert_eq!(state.snake.head(), (6, 5));
        assert_eq!(state.snake.direction(), Direction::Right);
    }

    #[test]
    fn pending_turn_applies_before_the_move() {
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let mut state = state_with(snake, vec![far_food()]);

        state.step(Some(Direction::Up), &mut rng());

        assert_eq!(state.snake.head(), (5, 4));
    }

    #[test]
    fn wall_hit_ends_the_game() {
        let snake = Snake::from_segments(vec![(20, 5), (19, 5), (18, 5)], Direction::Right);
        let mut state = state_with(snake, vec![far_food()]);

        match state.step(None, &mut rng()) {
            TickResult::Ended(outcome) => assert_eq!(outcome, Outcome::Wall),
            TickResult::Moved { .. } => panic!("expected wall hit"),
        }
        assert_eq!(state.outcome, Some(Outcome::Wall));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn chasing_the_tail_is_not_fatal() {
        // Head (5,5) moving down onto the tail (5,6), which vacates this tick.
        let snake =
            Snake::from_segments(vec![(5, 5), (4, 5), (4, 6), (5, 6)], Direction::Down);
        let mut state = state_with(snake, vec![far_food()]);

        match state.step(None, &mut rng()) {
            TickResult::Moved { new_head, .. } => assert_eq!(new_head, (5, 6)),
            TickResult::Ended(outcome) => panic!("unexpected end: {:?}", outcome),
        }

        let body: Vec<_> = state.snake.segments().copied().collect();
        assert_eq!(body, vec![(5, 6), (5, 5), (4, 5), (4, 6)]);
    }

    #[test]
    fn chasing_the_tail_while_growing_is_fatal() {
        // Same shape, but food on the tail cell: the tail stays put.
        let snake =
            Snake::from_segments(vec![(5, 5), (4, 5), (4, 6), (5, 6)], Direction::Down);
        let food = Food { pos: (5, 6), kind: FoodKind::Normal };
        let mut state = state_with(snake, vec![food]);

        match state.step(None, &mut rng()) {
            TickResult::Ended(outcome) => assert_eq!(outcome, Outcome::SelfHit),
            TickResult::Moved { .. } => panic!("expected self collision"),
        }
    }

    #[test]
    fn hitting_the_body_is_fatal() {
        let snake = Snake::from_segments(
            vec![(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)],
            Direction::Down,
        );
        let mut state = state_with(snake, vec![far_food()]);

        match state.step(None, &mut rng()) {
            TickResult::Ended(outcome) => assert_eq!(outcome, Outcome::SelfHit),
            TickResult::Moved { .. } => panic!("expected self collision"),
        }
    }

    #[test]
    fn eating_grows_scores_and_respawns() {
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let food = Food { pos: (6, 5), kind: FoodKind::Bonus };
        let mut state = state_with(snake, vec![food, far_food()]);

        match state.step(None, &mut rng()) {
            TickResult::Moved { freed_tail, eaten, .. } => {
                assert_eq!(freed_tail, None);
                let (kind, respawned) = eaten.expect("food should be eaten");
                assert_eq!(kind, FoodKind::Bonus);
                assert_ne!(respawned.pos, (6, 5));
            }
            TickResult::Ended(outcome) => panic!("unexpected end: {:?}", outcome),
        }

        assert_eq!(state.score, 3);
        assert_eq!(state.highscore, 3);
        assert_eq!(state.snake.len(), 4);

        // Respawned food sits on a free cell.
        for food in &state.foods {
            assert!(state.bounds.contains(food.pos));
            assert!(!state.snake.occupies(food.pos));
        }
        assert_ne!(state.foods[0].pos, state.foods[1].pos);
    }

    #[test]
    fn normal_fast_and_slow_score_one_point() {
        for kind in [FoodKind::Normal, FoodKind::Fast, FoodKind::Slow].iter() {
            let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
            let food = Food { pos: (6, 5), kind: *kind };
            let mut state = state_with(snake, vec![food]);

            state.step(None, &mut rng());

            assert_eq!(state.score, 1);
        }
    }

    #[test]
    fn speed_deltas_stay_clamped() {
        // Slow food at the ceiling keeps the interval at the ceiling.
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let food = Food { pos: (6, 5), kind: FoodKind::Slow };
        let mut state = state_with(snake, vec![food]);
        state.tick_ms = 295;
        state.step(None, &mut rng());
        assert_eq!(state.tick_ms, MAX_TICK_MS);

        // Fast food at the floor keeps it at the floor.
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let food = Food { pos: (6, 5), kind: FoodKind::Fast };
        let mut state = state_with(snake, vec![food]);
        state.tick_ms = MIN_TICK_MS;
        state.step(None, &mut rng());
        assert_eq!(state.tick_ms, MIN_TICK_MS);
    }

    #[test]
    fn any_pickup_sequence_keeps_the_interval_in_range() {
        let mut rng = rng();
        let wide = Bounds { min_x: 1, max_x: 100, min_y: 1, max_y: 10 };
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let mut state = GameState {
            bounds: wide,
            snake,
            foods: vec![Food { pos: (100, 10), kind: FoodKind::Normal }],
            score: 0,
            highscore: 0,
            tick_ms: START_TICK_MS,
            outcome: None,
        };

        for i in 0..30 {
            let kind = if i % 2 == 0 { FoodKind::Fast } else { FoodKind::Slow };
            state.foods[0] = Food { pos: state.snake.next_head(), kind };

            match state.step(None, &mut rng) {
                TickResult::Moved { .. } => {}
                TickResult::Ended(outcome) => panic!("unexpected end: {:?}", outcome),
            }
            assert!(state.tick_ms >= MIN_TICK_MS && state.tick_ms <= MAX_TICK_MS);
        }
    }

    #[test]
    fn highscore_never_decreases() {
        let snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)], Direction::Right);
        let food = Food { pos: (6, 5), kind: FoodKind::Normal };
        let mut state = state_with(snake, vec![food]);
        state.highscore = 10;

        state.step(None, &mut rng());

        assert_eq!(state.score, 1);
        assert_eq!(state.highscore, 10);
    }

    #[test]
    fn outcome_messages_are_distinct() {
        let outcomes = [Outcome::Wall, Outcome::SelfHit, Outcome::Resized, Outcome::Quit];
        for (i, a) in outcomes.iter().enumerate() {
            for b in &outcomes[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }
}
