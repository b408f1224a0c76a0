use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// What the user wants the Lab Reader API to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Analysis,
    Medication,
}

impl TaskKind {
    /// The Lab Reader API endpoint path for this task.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Analysis => "/lab/read-analysis",
            Self::Medication => "/lab/read-medication",
        }
    }

    /// The reply-keyboard label for this task.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analysis => "Analysis",
            Self::Medication => "Medication",
        }
    }

    /// Parse a keyboard reply, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "analysis" => Some(Self::Analysis),
            "medication" => Some(Self::Medication),
            _ => None,
        }
    }
}

/// Language in which the user wants the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    French,
    Arabic,
    Spanish,
}

impl Language {
    /// The value sent as the `language` query parameter (and shown on the keyboard).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Arabic => "Arabic",
            Self::Spanish => "Spanish",
        }
    }

    /// Parse a keyboard reply, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "english" => Some(Self::English),
            "french" => Some(Self::French),
            "arabic" => Some(Self::Arabic),
            "spanish" => Some(Self::Spanish),
            _ => None,
        }
    }
}

/// A Telegram file handle captured from a photo or document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: String,
    pub file_name: String,
}

/// Where a chat currently is in the guided conversation.
///
/// `ChoosingTask` through `AwaitingUpload` is the `/start` flow; `AwaitingChoice`
/// is the upload-first flow where the file arrives before any selection and the
/// user picks a task/language combination from an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step")]
pub enum ConversationState {
    ChoosingTask,
    ChoosingLanguage { task: TaskKind },
    AwaitingUpload { task: TaskKind, language: Language },
    AwaitingChoice { file: StoredFile },
}

/// Parse inline-keyboard callback data (`ans_en`, `med_fr`, ...) into a
/// task/language pair. Callback payloads must stay under Telegram's 64-byte
/// limit, hence the short codes.
pub fn parse_callback_choice(data: &str) -> Option<(TaskKind, Language)> {
    let (task_code, lang_code) = data.split_once('_')?;

    let task = match task_code {
        "ans" => TaskKind::Analysis,
        "med" => TaskKind::Medication,
        _ => return None,
    };

    let language = match lang_code {
        "en" => Language::English,
        "fr" => Language::French,
        _ => return None,
    };

    Some((task, language))
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_parses_keyboard_labels() {
        assert_eq!(TaskKind::parse("Analysis"), Some(TaskKind::Analysis));
        assert_eq!(TaskKind::parse("medication"), Some(TaskKind::Medication));
        assert_eq!(TaskKind::parse("  ANALYSIS  "), Some(TaskKind::Analysis));
        assert_eq!(TaskKind::parse("bloodwork"), None);
    }

    #[test]
    fn task_maps_to_endpoint() {
        assert_eq!(TaskKind::Analysis.endpoint(), "/lab/read-analysis");
        assert_eq!(TaskKind::Medication.endpoint(), "/lab/read-medication");
    }

    #[test]
    fn language_parses_keyboard_labels() {
        assert_eq!(Language::parse("English"), Some(Language::English));
        assert_eq!(Language::parse("french"), Some(Language::French));
        assert_eq!(Language::parse("ARABIC"), Some(Language::Arabic));
        assert_eq!(Language::parse("Klingon"), None);
    }

    #[test]
    fn callback_choice_parses_known_codes() {
        assert_eq!(parse_callback_choice("ans_en"), Some((TaskKind::Analysis, Language::English)));
        assert_eq!(parse_callback_choice("ans_fr"), Some((TaskKind::Analysis, Language::French)));
        assert_eq!(parse_callback_choice("med_en"), Some((TaskKind::Medication, Language::English)));
        assert_eq!(parse_callback_choice("med_fr"), Some((TaskKind::Medication, Language::French)));
    }

    #[test]
    fn callback_choice_rejects_garbage() {
        assert_eq!(parse_callback_choice(""), None);
        assert_eq!(parse_callback_choice("ans"), None);
        assert_eq!(parse_callback_choice("ans_de"), None);
        assert_eq!(parse_callback_choice("foo_en"), None);
    }

    #[test]
    fn conversation_state_round_trips_through_json() {
        let state = ConversationState::AwaitingUpload {
            task: TaskKind::Medication,
            language: Language::Arabic,
        };

        let json = serde_json::to_string(&state).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, back);
    }
}
