use std::cmp::min;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::food::{Food, FoodKind};
use crate::score::ScoreStore;
use crate::snake::Direction;
use crate::state::{Bounds, GameState, Outcome, TickResult};
use crate::term::TermManager;
use crate::Cell;

const BODY_CHAR: char = '█';
const DEAD_CHAR: char = 'X';

/// Board rectangle in terminal coordinates, border included.
struct Board {
    left: i16,
    top: i16,
    right: i16,
    bottom: i16,
}

impl Board {
    fn inner(&self) -> Bounds {
        Bounds {
            min_x: self.left + 1,
            max_x: self.right - 1,
            min_y: self.top + 1,
            max_y: self.bottom - 1,
        }
    }

    fn status_row(&self) -> i16 {
        self.bottom + 1
    }

    fn legend_row(&self) -> i16 {
        self.bottom + 2
    }
}

pub struct SnakeGame {
    term: TermManager,
    store: ScoreStore,
    board: Board,
    highscore: u32,
}

impl SnakeGame {
    pub fn new(config: Config) -> Result<Self> {
        let term = TermManager::new()?;
        let (term_w, term_h) = term.size();

        // Shrink the configured board to fit, then center it.
        let width = min(config.board_width, term_w.saturating_sub(5)) as i16;
        let height = min(config.board_height, term_h.saturating_sub(5)) as i16;
        if width < 10 || height < 5 {
            bail!("terminal is too small for a playable board");
        }

        let left = (term_w as i16 - width) / 2;
        let top = (term_h as i16 - height) / 2 - 1;
        let board = Board { left, top, right: left + width - 1, bottom: top + height - 1 };

        let store = ScoreStore::new(config.highscore_path);
        let highscore = store.load();

        Ok(SnakeGame { term, store, board, highscore })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let session = self.session();
        let restored = self.term.restore();

        let (outcome, score) = session?;
        restored?;

        println!(
            "{} Final score: {}. Highscore: {}. Thanks for playing!",
            outcome.message(),
            score,
            self.highscore
        );
        Ok(())
    }

    fn session(&mut self) -> Result<(Outcome, u32)> {
        if !self.show_intro()? {
            return Ok((Outcome::Quit, 0));
        }

        loop {
            let (outcome, score) = self.play_one_game()?;
            self.store.save(self.highscore)?;

            match outcome {
                Outcome::Wall | Outcome::SelfHit => {
                    if !self.offer_replay(outcome, score)? {
                        return Ok((outcome, score));
                    }
                }
                Outcome::Resized | Outcome::Quit => return Ok((outcome, score)),
            }
        }
    }

    fn play_one_game(&mut self) -> Result<(Outcome, u32)> {
        let mut rng = rand::thread_rng();
        let mut state = GameState::new(self.board.inner(), self.highscore, &mut rng);

        self.draw_board(&state)?;

        let outcome = loop {
            if self.term.has_resized() {
                break Outcome::Resized;
            }

            // Drain the whole input queue, keeping only the last turn key.
            let mut pending = None;
            let mut quit = false;
            for ev in self.term.drain_keys()? {
                if is_quit_key(&ev) {
                    quit = true;
                } else if let Some(dir) = direction_for(&ev) {
                    pending = Some(dir);
                }
            }
            if quit {
                break Outcome::Quit;
            }

            match state.step(pending, &mut rng) {
                TickResult::Ended(outcome) => {
                    self.draw_dead_snake(&state)?;
                    break outcome;
                }
                TickResult::Moved { new_head, old_head, freed_tail, eaten } => {
                    self.draw_tick(&state, new_head, old_head, freed_tail, eaten)?;
                }
            }

            sleep(Duration::from_millis(state.tick_ms));
        };

        state.outcome = Some(outcome);
        self.highscore = state.highscore;
        Ok((outcome, state.score))
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_intro(&mut self) -> Result<bool> {
        self.term.show_overlay(&[
            "Arrow keys or WASD to steer",
            "@ +1   $ +3   F faster   S slower",
            "Esc or q to quit",
            "",
            "Press any key to start",
        ])?;

        let key = self.term.wait_key()?;
        Ok(!is_quit_key(&key))
    }

    fn offer_replay(&mut self, outcome: Outcome, score: u32) -> Result<bool> {
        let score_line = format!("Score: {}    Highscore: {}", score, self.highscore);
        self.term.show_overlay(&[
            outcome.message(),
            &score_line,
            "",
            "Press Y to play again,",
            "any other key to quit.",
        ])?;

        let key = self.term.wait_key()?;
        Ok(matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')))
    }

    fn draw_board(&mut self, state: &GameState) -> Result<()> {
        self.term.clear()?;
        self.term.draw_border(
            (self.board.left, self.board.top),
            (self.board.right, self.board.bottom),
        )?;

        for food in &state.foods {
            self.term.put(food.pos, food.kind.symbol())?;
        }

        let mut segments = state.snake.segments();
        if let Some(head) = segments.next() {
            self.term.put(*head, state.snake.head_char())?;
        }
        for cell in segments {
            self.term.put(*cell, BODY_CHAR)?;
        }

        self.draw_status(state)?;
        self.term.put_str(
            (self.board.left, self.board.legend_row()),
            "@ +1   $ +3   F faster   S slower",
        )?;
        self.term.flush()
    }

    fn draw_status(&mut self, state: &GameState) -> Result<()> {
        let line = format!("Score: {}    Highscore: {}    ", state.score, state.highscore);
        self.term.put_str((self.board.left, self.board.status_row()), &line)
    }

    // The tail is erased first: a respawned food may land on the freed cell.
    fn draw_tick(
        &mut self,
        state: &GameState,
        new_head: Cell,
        old_head: Cell,
        freed_tail: Option<Cell>,
        eaten: Option<(FoodKind, Food)>,
    ) -> Result<()> {
        if let Some(tail) = freed_tail {
            self.term.put(tail, ' ')?;
        }

        self.term.put(old_head, BODY_CHAR)?;
        self.term.put(new_head, state.snake.head_char())?;

        if let Some((_, respawned)) = eaten {
            self.term.put(respawned.pos, respawned.kind.symbol())?;
            self.draw_status(state)?;
        }

        self.term.flush()
    }

    fn draw_dead_snake(&mut self, state: &GameState) -> Result<()> {
        for cell in state.snake.segments() {
            self.term.put(*cell, DEAD_CHAR)?;
        }
        self.term.flush()
    }
}

fn is_quit_key(ev: &KeyEvent) -> bool {
    if ev.modifiers == KeyModifiers::CONTROL && ev.code == KeyCode::Char('c') {
        return true;
    }
    matches!(ev.code, KeyCode::Esc | KeyCode::Char('q'))
}

fn direction_for(ev: &KeyEvent) -> Option<Direction> {
    match ev.code {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}
