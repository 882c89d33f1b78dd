// The two-line LCD as a shared text model: handlers write through the
// TextDisplay trait, the front panel renders whatever is currently
// showing.

use std::sync::Mutex;

use crate::board::TextDisplay;

#[derive(Default)]
pub struct LcdModel {
    lines: Mutex<Vec<String>>,
}

impl LcdModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl TextDisplay for LcdModel {
    fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }

    fn write_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
