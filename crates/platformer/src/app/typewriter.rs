use tracing::debug;

/// Reveals text one character per interval. A skip request shows the rest
/// at the next tick.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    char_interval: f32,
    revealed_chars: usize,
    revealed_bytes: usize,
    timer: f32,
    skip_requested: bool,
    total_chars: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, char_interval: f32) -> Self {
        let text = text.into();
        let total_chars = text.chars().count();
        Self {
            text,
            char_interval: char_interval.max(0.0),
            revealed_chars: 0,
            revealed_bytes: 0,
            timer: 0.0,
            skip_requested: false,
            total_chars,
        }
    }

    pub fn visible_text(&self) -> &str {
        &self.text[..self.revealed_bytes]
    }

    pub fn revealed_chars(&self) -> usize {
        self.revealed_chars
    }

    pub fn is_typing(&self) -> bool {
        self.revealed_chars < self.total_chars
    }

    /// Only meaningful while typing.
    pub fn request_skip(&mut self) {
        if self.is_typing() {
            self.skip_requested = true;
        }
    }

    /// Returns true on the tick the text becomes complete.
    pub fn tick(&mut self, dt_seconds: f32) -> bool {
        if !self.is_typing() {
            return false;
        }
        if self.skip_requested {
            self.skip_requested = false;
            self.reveal_all();
            debug!(chars = self.total_chars, "typewriter_skipped");
            return true;
        }

        // The first character shows on the first tick.
        if self.revealed_chars == 0 {
            self.reveal_next();
        } else {
            self.timer += dt_seconds.max(0.0);
        }
        while self.is_typing() && self.timer >= self.char_interval {
            self.timer -= self.char_interval;
            self.reveal_next();
            if self.char_interval <= 0.0 {
                self.reveal_all();
            }
        }
        !self.is_typing()
    }

    fn reveal_next(&mut self) {
        if let Some(next) = self.text[self.revealed_bytes..].chars().next() {
            self.revealed_bytes += next.len_utf8();
            self.revealed_chars += 1;
        }
    }

    fn reveal_all(&mut self) {
        self.revealed_bytes = self.text.len();
        self.revealed_chars = self.total_chars;
    }
}
