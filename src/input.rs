/// Single-line text buffer with a byte-offset caret kept on char
/// boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        TextInput {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_boundary(self.cursor, &self.value);
    }

    pub fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_boundary(self.cursor, &self.value);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_boundary(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    pub fn insert_char(&mut self, ch: char) {
        // Single line.
        if ch == '\n' || ch == '\r' {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

fn prev_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_caret() {
        let mut input = TextInput::new("2024-01-0");
        input.insert_char('5');
        assert_eq!(input.value(), "2024-01-05");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "024-01-05");
        input.insert_char('1');
        assert_eq!(input.with_caret(), "1▌024-01-05");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "1024-01-0");
        assert_eq!(input.cursor(), input.value().len());
    }

    #[test]
    fn caret_stays_on_char_boundaries() {
        let mut input = TextInput::new("é1");
        input.move_left();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.move_right();
        assert_eq!(input.cursor(), 'é'.len_utf8());
        input.backspace();
        assert_eq!(input.value(), "1");
        input.insert_char('\n');
        assert_eq!(input.value(), "1");
    }
}
