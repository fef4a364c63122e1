use super::history::History;
use super::key::KeyEvent;
use super::surface::DisplaySurface;

/// Destructive backspace: step back, blank the cell, step back again
const ERASE_CHAR: &str = "\x08 \x08";

/// What a key event did to the current line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Still editing, the display is already up to date
    Editing,
    /// Enter on an empty or whitespace-only line
    Blank,
    /// The clear command was entered and the display has been cleared
    Cleared,
    /// A trimmed, non-empty command ready for dispatch
    Command(String),
    /// Line abandoned with Ctrl+C
    Interrupted,
}

/// Single-line editor with history recall
///
/// Keeps the input buffer and what is rendered after the prompt in step:
/// every buffer mutation is mirrored to the surface in the same call.
#[derive(Debug)]
pub struct LineEditor {
    prompt: String,
    clear_command: String,
    buffer: String,
    history: History,
}

impl LineEditor {
    pub fn new(prompt: impl Into<String>, clear_command: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            clear_command: clear_command.into(),
            buffer: String::new(),
            history: History::new(),
        }
    }

    /// Apply one key event
    pub fn handle_key(&mut self, key: KeyEvent, surface: &mut dyn DisplaySurface) -> LineOutcome {
        match key {
            KeyEvent::Char(c) => {
                self.buffer.push(c);
                let mut encoded = [0u8; 4];
                surface.write(c.encode_utf8(&mut encoded));
                LineOutcome::Editing
            }
            KeyEvent::Backspace => {
                self.backspace(surface);
                LineOutcome::Editing
            }
            KeyEvent::Enter => self.submit(surface),
            KeyEvent::Up => {
                if let Some(entry) = self.history.recall_previous() {
                    let entry = entry.to_string();
                    self.replace_line(entry, surface);
                }
                LineOutcome::Editing
            }
            KeyEvent::Down => {
                if let Some(entry) = self.history.recall_next() {
                    let entry = entry.to_string();
                    self.replace_line(entry, surface);
                }
                LineOutcome::Editing
            }
            KeyEvent::Interrupt => {
                surface.write("^C");
                self.buffer.clear();
                self.history.reset_cursor();
                LineOutcome::Interrupted
            }
            KeyEvent::Ignored => LineOutcome::Editing,
        }
    }

    /// Write the prompt at the cursor
    pub fn render_prompt(&self, surface: &mut dyn DisplaySurface) {
        surface.write(&self.prompt);
    }

    /// Prompt width in cells
    pub fn prompt_len(&self) -> usize {
        self.prompt.chars().count()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Cells taken by the prompt and the input, across wrapped rows
    fn line_cells(&self) -> usize {
        self.prompt_len() + self.buffer.chars().count()
    }

    fn backspace(&mut self, surface: &mut dyn DisplaySurface) {
        let cells = self.line_cells();
        // Never erase into the prompt
        if cells <= self.prompt_len() || self.buffer.pop().is_none() {
            return;
        }

        let width = surface.columns().max(1);
        match cells % width {
            // Row is full and the cursor is parked on its last cell
            0 => surface.write(&format!("\x1b[{}G\x1b[K", width)),
            // Only cell on a continuation row: wipe the row, then rewrite the
            // previous cell so the cursor parks at the end of the row above
            1 if cells > 1 => {
                let last = self.prompt.chars().chain(self.buffer.chars()).last().unwrap_or(' ');
                surface.write(&format!("\r\x1b[K\x1b[A\x1b[{}G{}", width, last));
            }
            _ => surface.write(ERASE_CHAR),
        }
    }

    fn submit(&mut self, surface: &mut dyn DisplaySurface) -> LineOutcome {
        let line = std::mem::take(&mut self.buffer);
        let command = line.trim();

        if command.is_empty() {
            return LineOutcome::Blank;
        }

        self.history.push(command.to_string());

        if command == self.clear_command {
            surface.clear();
            return LineOutcome::Cleared;
        }

        LineOutcome::Command(command.to_string())
    }

    /// Swap the rendered line for `line`
    /// Moves up to the prompt's row when the old line wrapped, puts the cursor
    /// on the first column after the prompt (CHA is 1-based) and erases to the
    /// end of the screen before rewriting.
    fn replace_line(&mut self, line: String, surface: &mut dyn DisplaySurface) {
        let width = surface.columns().max(1);
        let rows_up = self.line_cells().saturating_sub(1) / width;

        let mut erase = String::new();
        if rows_up > 0 {
            erase.push_str(&format!("\x1b[{}A", rows_up));
        }
        erase.push_str(&format!("\x1b[{}G\x1b[J", self.prompt_len() + 1));
        surface.write(&erase);
        surface.write(&line);
        self.buffer = line;
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    fn editor_with_prompt() -> (LineEditor, HeadlessSurface) {
        let editor = LineEditor::new("$ ", "clear");
        let mut surface = HeadlessSurface::default();
        editor.render_prompt(&mut surface);
        (editor, surface)
    }

    fn type_text(editor: &mut LineEditor, surface: &mut HeadlessSurface, text: &str) {
        for c in text.chars() {
            editor.handle_key(KeyEvent::Char(c), surface);
        }
    }

    #[test]
    fn test_typing_appends_and_echoes() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "echo hi");
        assert_eq!(editor.buffer(), "echo hi");
        assert_eq!(surface.current_line(), "$ echo hi");
    }

    #[test]
    fn test_backspace_erases_last_char() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "lsx");
        editor.handle_key(KeyEvent::Backspace, &mut surface);
        assert_eq!(editor.buffer(), "ls");
        assert_eq!(surface.current_line().trim_end(), "$ ls");
        assert_eq!(surface.cursor_column(), 4);
    }

    #[test]
    fn test_backspace_stops_at_prompt() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "a");
        editor.handle_key(KeyEvent::Backspace, &mut surface);
        surface.clear_transcript();

        editor.handle_key(KeyEvent::Backspace, &mut surface);
        assert_eq!(editor.buffer(), "");
        assert!(surface.transcript().is_empty());
        assert_eq!(surface.cursor_column(), 2);
    }

    #[test]
    fn test_enter_trims_and_records() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "  ls -la ");
        let outcome = editor.handle_key(KeyEvent::Enter, &mut surface);
        assert_eq!(outcome, LineOutcome::Command("ls -la".to_string()));
        assert_eq!(editor.buffer(), "");
        assert_eq!(editor.history().entries(), &["ls -la".to_string()]);
    }

    #[test]
    fn test_blank_enter_leaves_history_alone() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "   ");
        let outcome = editor.handle_key(KeyEvent::Enter, &mut surface);
        assert_eq!(outcome, LineOutcome::Blank);
        assert!(editor.history().is_empty());
        assert_eq!(editor.history().cursor(), 0);
    }

    #[test]
    fn test_clear_command_clears_and_is_recorded() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "clear");
        let outcome = editor.handle_key(KeyEvent::Enter, &mut surface);
        assert_eq!(outcome, LineOutcome::Cleared);
        assert_eq!(editor.history().entries(), &["clear".to_string()]);
        assert_eq!(surface.contents().trim(), "");
    }

    #[test]
    fn test_recall_rewrites_line_after_prompt() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "a much longer command");
        editor.handle_key(KeyEvent::Enter, &mut surface);
        surface.write("\r\n");
        editor.render_prompt(&mut surface);
        type_text(&mut editor, &mut surface, "partial text here");

        editor.handle_key(KeyEvent::Up, &mut surface);
        assert_eq!(editor.buffer(), "a much longer command");
        assert_eq!(surface.current_line(), "$ a much longer command");

        editor.handle_key(KeyEvent::Down, &mut surface);
        assert_eq!(editor.buffer(), "");
        assert_eq!(surface.current_line().trim_end(), "$");
        assert_eq!(surface.cursor_column(), 2);
    }

    #[test]
    fn test_backspace_across_wrapped_rows() {
        let mut editor = LineEditor::new("$ ", "clear");
        let mut surface = HeadlessSurface::new(20, 10);
        editor.render_prompt(&mut surface);
        let full_row = "a".repeat(18);

        type_text(&mut editor, &mut surface, &full_row);
        assert_eq!(surface.cursor_position(), (0, 20));
        type_text(&mut editor, &mut surface, "bc");
        assert_eq!(surface.cursor_position(), (1, 2));

        editor.handle_key(KeyEvent::Backspace, &mut surface);
        assert_eq!(surface.cursor_position(), (1, 1));

        // Last cell of the continuation row, back to the end of the first row
        editor.handle_key(KeyEvent::Backspace, &mut surface);
        assert_eq!(editor.buffer(), full_row);
        assert_eq!(surface.cursor_position(), (0, 20));
        assert_eq!(surface.contents().trim_end(), format!("$ {}", full_row));

        // Last cell of a full row
        editor.handle_key(KeyEvent::Backspace, &mut surface);
        assert_eq!(editor.buffer(), "a".repeat(17));
        assert_eq!(surface.cursor_position(), (0, 19));
        type_text(&mut editor, &mut surface, "z");
        assert_eq!(surface.current_line(), format!("$ {}z", "a".repeat(17)));

        for _ in 0..30 {
            editor.handle_key(KeyEvent::Backspace, &mut surface);
        }
        assert_eq!(editor.buffer(), "");
        assert_eq!(surface.cursor_position(), (0, 2));
        assert_eq!(surface.contents().trim_end(), "$");
    }

    #[test]
    fn test_recall_clears_every_wrapped_row() {
        let mut editor = LineEditor::new("$ ", "clear");
        let mut surface = HeadlessSurface::new(20, 10);
        editor.render_prompt(&mut surface);
        let long = "b".repeat(30);
        type_text(&mut editor, &mut surface, &long);
        editor.handle_key(KeyEvent::Enter, &mut surface);
        surface.write("\r\n");
        editor.render_prompt(&mut surface);

        editor.handle_key(KeyEvent::Up, &mut surface);
        assert_eq!(editor.buffer(), long);
        assert_eq!(surface.cursor_position(), (3, 12));

        editor.handle_key(KeyEvent::Down, &mut surface);
        assert_eq!(editor.buffer(), "");
        assert_eq!(surface.cursor_position(), (2, 2));
        assert_eq!(surface.contents().trim_end(), format!("$ {}\n$", long));
    }

    #[test]
    fn test_interrupt_abandons_line() {
        let (mut editor, mut surface) = editor_with_prompt();
        type_text(&mut editor, &mut surface, "first");
        editor.handle_key(KeyEvent::Enter, &mut surface);
        editor.handle_key(KeyEvent::Up, &mut surface);

        let outcome = editor.handle_key(KeyEvent::Interrupt, &mut surface);
        assert_eq!(outcome, LineOutcome::Interrupted);
        assert_eq!(editor.buffer(), "");
        assert_eq!(editor.history().cursor(), 1);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_ignored_keys_change_nothing() {
        let (mut editor, mut surface) = editor_with_prompt();
        surface.clear_transcript();
        assert_eq!(editor.handle_key(KeyEvent::Ignored, &mut surface), LineOutcome::Editing);
        assert!(surface.transcript().is_empty());
    }
}
