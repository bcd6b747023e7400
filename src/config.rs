use std::path::PathBuf;

/// Fixed startup configuration. There are no CLI flags; the board is clamped
/// to the terminal at startup if it does not fit.
#[derive(Debug, Clone)]
pub struct Config {
    pub board_width: u16,
    pub board_height: u16,
    pub highscore_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_width: 60,
            board_height: 20,
            highscore_path: PathBuf::from("highscore.txt"),
        }
    }
}
