use super::text_input::TextInputState;

/// What a prompt's answer is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Start,
    Pause,
    Resume,
    Stop,
    Destination,
    UserName,
    Company,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::Start => " Start Session ",
            PromptKind::Pause => " Pause Session ",
            PromptKind::Resume => " Resume Session ",
            PromptKind::Stop => " Stop Session ",
            PromptKind::Destination => " Master Archive Folder ",
            PromptKind::UserName => " Support Name ",
            PromptKind::Company => " Company ",
        }
    }

    /// Text the input starts with for session transitions
    pub fn default_comment(&self) -> Option<&'static str> {
        match self {
            PromptKind::Start => Some("Starting work"),
            PromptKind::Pause => Some("Pausing to take note or a break."),
            PromptKind::Resume => Some("Continuing work. Note: "),
            PromptKind::Stop => Some("Pending further action or completed task"),
            _ => None,
        }
    }

    pub fn is_transition(&self) -> bool {
        self.default_comment().is_some()
    }
}

/// Modal single-line prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: TextInputState,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Self {
            kind,
            input: TextInputState::with_value(initial),
        }
    }

    /// Prompt for a session transition, pre-filled with its default comment
    pub fn transition(kind: PromptKind) -> Self {
        Self::new(kind, kind.default_comment().unwrap_or_default())
    }

    pub fn answer(&self) -> String {
        self.input.value().trim().to_string()
    }
}
