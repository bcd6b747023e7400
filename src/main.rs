mod config;
mod food;
mod game;
mod score;
mod snake;
mod state;
mod term;

use anyhow::Result;

use crate::config::Config;
use crate::game::SnakeGame;

/// A grid cell in absolute terminal coordinates. Signed so that direction
/// deltas compose without underflow at the left/top edges.
pub type Cell = (i16, i16);

fn main() -> Result<()> {
    let mut game = SnakeGame::new(Config::default())?;
    game.run()
}
