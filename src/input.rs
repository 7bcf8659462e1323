use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, IsTerminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Other,
}

/// Source of single keystrokes for the interactive pager.
pub trait KeySource {
    /// Blocks until one key arrives. A closed or failing input is an error.
    fn next_key(&mut self) -> io::Result<Keystroke>;
}

/// Reads from the process stdin: a raw-mode key press on a terminal, or the
/// next non-newline byte when stdin is piped.
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Keystroke> {
        if io::stdin().is_terminal() {
            read_raw_key()
        } else {
            read_piped_key(&mut io::stdin().lock())
        }
    }
}

fn read_raw_key() -> io::Result<Keystroke> {
    enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(map_key(key)),
            Ok(_) => continue,
            Err(error) => break Err(error),
        }
    };
    let restored = disable_raw_mode();
    let key = result?;
    restored?;
    Ok(key)
}

pub fn map_key(key: KeyEvent) -> Keystroke {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || c.is_uppercase() => Keystroke::Char(c),
        _ => Keystroke::Other,
    }
}

pub fn read_piped_key(reader: &mut impl BufRead) -> io::Result<Keystroke> {
    loop {
        let byte = {
            let buffer = reader.fill_buf()?;
            let Some(&byte) = buffer.first() else {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a key was pressed",
                ));
            };
            byte
        };
        reader.consume(1);

        match byte {
            b'\n' | b'\r' => continue,
            byte if byte.is_ascii() => return Ok(Keystroke::Char(byte as char)),
            _ => return Ok(Keystroke::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Keystroke, map_key, read_piped_key};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::io::{Cursor, ErrorKind};

    #[test]
    fn piped_input_skips_line_endings() {
        let mut input = Cursor::new(b"n\r\nq\n".to_vec());
        assert_eq!(read_piped_key(&mut input).ok(), Some(Keystroke::Char('n')));
        assert_eq!(read_piped_key(&mut input).ok(), Some(Keystroke::Char('q')));

        let error = read_piped_key(&mut input).expect_err("input exhausted");
        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn ctrl_c_is_not_a_plain_char() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)),
            Keystroke::Char('n')
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Keystroke::Char('N')
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Keystroke::Other
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Keystroke::Other
        );
    }
}
