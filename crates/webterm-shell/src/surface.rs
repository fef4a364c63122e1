/// Display surface abstraction over a terminal renderer
///
/// Implementations own the actual terminal widget (xterm.js in the browser,
/// a vt100 parser in tests). Everything the shell and the bridge render goes
/// through here, ANSI sequences included.
pub trait DisplaySurface {
    /// Write raw text, escape sequences are interpreted by the renderer
    fn write(&mut self, data: &str);

    /// Write text followed by a line break
    fn write_line(&mut self, data: &str);

    /// Clear the screen
    /// Afterwards the cursor sits at column 0 of an empty line.
    fn clear(&mut self);

    /// Width in cells, rows wrap past this
    fn columns(&self) -> usize;

    /// Give keyboard focus to the surface
    fn focus(&mut self);

    /// Release the underlying renderer
    /// Nothing may be written after this.
    fn dispose(&mut self);
}

/// Terminal size in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

/// A surface that can be re-fitted to its container
pub trait FitSurface: DisplaySurface {
    /// Resize the terminal to fill its container
    /// Returns the resulting size, or None when the container has no layout yet.
    fn fit(&mut self) -> Option<TerminalSize>;
}
