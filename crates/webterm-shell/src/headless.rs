use std::cell::RefCell;
use std::rc::Rc;

use vt100::Parser;

use super::surface::{DisplaySurface, FitSurface, TerminalSize};
use super::{DEFAULT_COLS, DEFAULT_ROWS};

const SCROLLBACK_LINES: usize = 1000;

/// One call made against a surface, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Write(String),
    WriteLine(String),
    Clear,
    Focus,
    Dispose,
}

struct ScreenState {
    parser: Parser,
    transcript: Vec<SurfaceOp>,
    cols: u16,
    rows: u16,
    disposed: bool,
    writes_after_dispose: usize,
}

impl ScreenState {
    fn record(&mut self, op: SurfaceOp) {
        if self.disposed {
            self.writes_after_dispose += 1;
            log::warn!("Surface used after dispose: {:?}", op);
        }
        self.transcript.push(op);
    }
}

/// Display surface backed by a vt100 screen
///
/// Clones share the same screen, so a test can hand one clone to the shell
/// and keep another to inspect what was rendered.
#[derive(Clone)]
pub struct HeadlessSurface {
    state: Rc<RefCell<ScreenState>>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS)
    }
}

impl HeadlessSurface {
    /// Create a new headless surface
    pub fn new(cols: u16, rows: u16) -> Self {
        let state = ScreenState {
            parser: Parser::new(rows, cols, SCROLLBACK_LINES),
            transcript: Vec::new(),
            cols,
            rows,
            disposed: false,
            writes_after_dispose: 0,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Visible screen as plain text
    pub fn contents(&self) -> String {
        self.state.borrow().parser.screen().contents()
    }

    /// Text of the row the cursor is on
    pub fn current_line(&self) -> String {
        let state = self.state.borrow();
        let screen = state.parser.screen();
        let (row, _) = screen.cursor_position();
        let (_, cols) = screen.size();
        let line = screen.rows(0, cols).nth(row as usize).unwrap_or_default();
        line
    }

    /// Cursor position (row, col)
    /// A column equal to the width means the row is full and the next
    /// character wraps.
    pub fn cursor_position(&self) -> (u16, u16) {
        self.state.borrow().parser.screen().cursor_position()
    }

    pub fn cursor_column(&self) -> usize {
        self.cursor_position().1 as usize
    }

    /// Every call made against the surface so far
    pub fn transcript(&self) -> Vec<SurfaceOp> {
        self.state.borrow().transcript.clone()
    }

    /// Forget the recorded calls, the screen is left as it is
    pub fn clear_transcript(&mut self) {
        self.state.borrow_mut().transcript.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Number of calls that arrived after dispose
    pub fn writes_after_dispose(&self) -> usize {
        self.state.borrow().writes_after_dispose
    }

    /// Change the size the next `fit` reports, as a container resize would
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let mut state = self.state.borrow_mut();
        state.cols = cols;
        state.rows = rows;
    }

    /// Terminal size the screen currently has
    pub fn size(&self) -> TerminalSize {
        let state = self.state.borrow();
        let (rows, cols) = state.parser.screen().size();
        TerminalSize { cols, rows }
    }
}

impl DisplaySurface for HeadlessSurface {
    fn write(&mut self, data: &str) {
        let mut state = self.state.borrow_mut();
        state.record(SurfaceOp::Write(data.to_string()));
        state.parser.process(data.as_bytes());
    }

    fn write_line(&mut self, data: &str) {
        let mut state = self.state.borrow_mut();
        state.record(SurfaceOp::WriteLine(data.to_string()));
        state.parser.process(data.as_bytes());
        state.parser.process(b"\r\n");
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.record(SurfaceOp::Clear);
        state.parser.process(b"\x1b[2J\x1b[H");
    }

    fn columns(&self) -> usize {
        let (_, cols) = self.state.borrow().parser.screen().size();
        cols as usize
    }

    fn focus(&mut self) {
        self.state.borrow_mut().record(SurfaceOp::Focus);
    }

    fn dispose(&mut self) {
        let mut state = self.state.borrow_mut();
        state.record(SurfaceOp::Dispose);
        state.disposed = true;
    }
}

impl FitSurface for HeadlessSurface {
    fn fit(&mut self) -> Option<TerminalSize> {
        let mut state = self.state.borrow_mut();
        let (cols, rows) = (state.cols, state.rows);
        state.parser.set_size(rows, cols);
        Some(TerminalSize { cols, rows })
    }
}
