use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue, style};

use crate::Cell;

/// Wraps the terminal behind the capabilities the game needs: cursor-addressed
/// writes, non-blocking key polling and size queries. Everything else talks to
/// this instead of the console directly.
pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("querying terminal size")?;
        Ok(TermManager { width, height, stdout: stdout() })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("entering alternate screen")?;
        terminal::enable_raw_mode().context("enabling raw mode")?;
        execute!(self.stdout, cursor::Hide)?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("disabling raw mode")?;
        execute!(self.stdout, cursor::Show)?;
        execute!(self.stdout, LeaveAlternateScreen).context("leaving alternate screen")?;
        Ok(())
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// True once the terminal no longer matches its startup dimensions.
    pub fn has_resized(&self) -> bool {
        terminal::size()
            .map(|size| size != (self.width, self.height))
            .unwrap_or(true)
    }

    /// Drains every event currently queued without blocking, returning the
    /// key events in arrival order.
    pub fn drain_keys(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn wait_key(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    pub fn put(&mut self, cell: Cell, ch: char) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(cell.0 as u16, cell.1 as u16),
            style::Print(ch)
        )?;
        Ok(())
    }

    pub fn put_str(&mut self, cell: Cell, text: &str) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(cell.0 as u16, cell.1 as u16),
            style::Print(text)
        )?;
        Ok(())
    }

    /// Draws a border around the rectangle spanned by the two corners,
    /// inclusive: `-` along the top and bottom, `|` on the sides, `+` corners.
    pub fn draw_border(&mut self, top_left: Cell, bottom_right: Cell) -> Result<()> {
        let (left, top) = top_left;
        let (right, bottom) = bottom_right;

        for x in left..=right {
            let ch = if x == left || x == right { '+' } else { '-' };
            self.put((x, top), ch)?;
            self.put((x, bottom), ch)?;
        }

        for y in top + 1..bottom {
            self.put((left, y), '|')?;
            self.put((right, y), '|')?;
        }

        self.flush()
    }

    /// Centered boxed message painted over the current screen content. The
    /// caller redraws the board afterwards if play continues.
    pub fn show_overlay(&mut self, lines: &[&str]) -> Result<()> {
        let box_width = lines.iter().map(|line| line.len()).max().unwrap_or(0) + 4;
        let box_height = lines.len() + 2;

        let left = self.width.saturating_sub(box_width as u16) / 2;
        let top = self.height.saturating_sub(box_height as u16) / 2;

        let blank = " ".repeat(box_width);
        self.put_str((left as i16, top as i16), &blank)?;
        self.put_str((left as i16, top as i16 + box_height as i16 - 1), &blank)?;

        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{: ^width$}", line, width = box_width);
            self.put_str((left as i16, top as i16 + 1 + i as i16), &padded)?;
        }

        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("flushing terminal output")?;
        Ok(())
    }
}
