/// Input events understood by the line editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Enter,
    Up,
    Down,
    /// Ctrl+C
    Interrupt,
    /// Anything the editor has no binding for (other escape sequences, stray controls)
    Ignored,
}

impl KeyEvent {
    /// Decode one chunk of terminal input into key events
    ///
    /// A chunk is whatever the terminal widget reports in one go: a single key,
    /// an escape sequence for a special key, or a whole paste.
    pub fn decode(data: &str) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        let mut chars = data.chars().peekable();
        let mut prev = None;

        while let Some(ch) = chars.next() {
            let event = match ch {
                '\r' => KeyEvent::Enter,
                '\n' if prev == Some('\r') => {
                    prev = Some(ch);
                    continue;
                }
                '\n' => KeyEvent::Enter,
                '\x7f' | '\x08' => KeyEvent::Backspace,
                '\x03' => KeyEvent::Interrupt,
                '\x1b' => match chars.peek() {
                    Some('[') | Some('O') => {
                        chars.next();
                        decode_sequence(&mut chars)
                    }
                    // Lone ESC, or ESC followed by an ordinary key (Alt+key)
                    _ => KeyEvent::Ignored,
                },
                c if c.is_control() => KeyEvent::Ignored,
                c => KeyEvent::Char(c),
            };
            prev = Some(ch);
            events.push(event);
        }

        events
    }
}

/// Consume the rest of a CSI/SS3 sequence (after `ESC [` or `ESC O`)
fn decode_sequence<I>(chars: &mut std::iter::Peekable<I>) -> KeyEvent
where
    I: Iterator<Item = char>,
{
    let mut params = String::new();
    while let Some(&c) = chars.peek() {
        chars.next();
        // Final byte of a control sequence
        if ('\x40'..='\x7e').contains(&c) {
            return match (params.as_str(), c) {
                ("", 'A') => KeyEvent::Up,
                ("", 'B') => KeyEvent::Down,
                _ => KeyEvent::Ignored,
            };
        }
        params.push(c);
    }
    KeyEvent::Ignored
}
