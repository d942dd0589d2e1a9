use crate::controller::{GenerationController, InputUpdate, Status};

/// Which input widget receives key presses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Email,
    Tone,
}

impl Focus {
    pub fn toggle(self) -> Focus {
        match self {
            Focus::Email => Focus::Tone,
            Focus::Tone => Focus::Email,
        }
    }
}

/// View-level state. The controller holds everything the generate flow owns;
/// the rest is presentation only.
pub struct UiState {
    pub controller: GenerationController,
    pub focus: Focus,
    pub show_help: bool,
    pub info: String,
    pub endpoint: String,
    pub tick: u64,
}

impl UiState {
    pub fn new(controller: GenerationController, endpoint: String) -> Self {
        Self {
            controller,
            focus: Focus::Email,
            show_help: false,
            info: String::new(),
            endpoint,
            tick: 0,
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        let mut content = self.controller.state().email_content.clone();
        content.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        self.controller.update_input(InputUpdate::Content(content));
    }

    pub fn backspace(&mut self) {
        let mut content = self.controller.state().email_content.clone();
        if content.pop().is_some() {
            self.controller.update_input(InputUpdate::Content(content));
        }
    }

    pub fn cycle_tone(&mut self, forward: bool) {
        let tone = self.controller.state().tone;
        let next = if forward { tone.next() } else { tone.prev() };
        self.controller.update_input(InputUpdate::Tone(next));
    }

    pub fn spinner(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
        FRAMES[(self.tick as usize / 2) % FRAMES.len()]
    }

    pub fn is_loading(&self) -> bool {
        self.controller.state().status == Status::Loading
    }
}

/// Number of terminal rows `text` occupies when wrapped at `width` columns.
pub fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = text
        .split('\n')
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}
