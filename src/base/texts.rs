//! User-facing message templates for the bot.

use crate::base::types::{Language, StoredFile, TaskKind};

/// Greeting sent on `/start`, before the task keyboard.
pub const WELCOME: &str = "Welcome to Lab Reader Bot! 🩺\n\n\
I can help you understand your medical reports or prescriptions.\n\n\
What would you like to process?";

/// Sent after `/cancel`.
pub const CANCELLED: &str = "Process cancelled. Use /start whenever you're ready.";

/// Sent for `/help` or when a message arrives outside a conversation.
pub const HELP: &str = "Send /start to begin. I'll ask what to process (an analysis \
report or a medication/prescription), which language you want the result in, and \
then for an image or PDF of the document.\n\n\
You can also just upload a file and pick an option from the buttons.\n\n\
Use /cancel at any time to stop.";

/// Acknowledgement while a document is being processed.
pub const PROCESSING: &str = "Processing your document... please wait. ⏳";

/// Sent when a callback arrives but the pending file is gone.
pub const SESSION_EXPIRED: &str = "❌ Session expired. Please upload your file again.";

/// Sent when the Lab Reader API cannot be reached at all.
pub const LAB_UNAVAILABLE: &str = "❌ Failed to connect to the analysis service.";

/// Fallback body when the API response carries no analysis text.
pub const NO_ANALYSIS: &str = "No analysis found.";

/// Confirmation after the task choice, before the language keyboard.
pub fn task_chosen(task: TaskKind) -> String {
    format!(
        "Understood! We'll process your {}.\n\nIn which language would you like to receive the results?",
        task.label()
    )
}

/// Confirmation after the language choice, asking for the upload.
pub fn upload_instructions(language: Language) -> String {
    format!(
        "Perfect. You'll receive the report in {}.\n\nNow, please upload your image or PDF document.",
        language.as_str()
    )
}

/// Prompt shown above the inline keyboard in the upload-first flow.
pub fn file_received(file: &StoredFile) -> String {
    format!("File received: {}\nWhat would you like me to do?", file.file_name)
}

/// Notice the inline-keyboard prompt is edited into once a choice is made.
pub fn processing_choice(task: TaskKind, language: Language) -> String {
    format!("Processing your {} in {}... ⏳", task.label().to_lowercase(), language.as_str())
}

/// Relayed when the Lab Reader API rejects a document.
pub fn api_error(detail: &str) -> String {
    format!("❌ Error from API: {detail}")
}

/// Reply-keyboard rows for the task choice.
pub fn task_keyboard() -> Vec<Vec<String>> {
    vec![vec![TaskKind::Analysis.label().to_string(), TaskKind::Medication.label().to_string()]]
}

/// Reply-keyboard rows for the language choice.
pub fn language_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![Language::English.as_str().to_string(), Language::French.as_str().to_string()],
        vec![Language::Arabic.as_str().to_string(), Language::Spanish.as_str().to_string()],
    ]
}

/// Inline-keyboard rows for the upload-first flow: `(label, callback_data)`.
pub fn choice_buttons() -> Vec<Vec<(String, String)>> {
    vec![
        vec![
            ("English Analysis".to_string(), "ans_en".to_string()),
            ("French Analysis".to_string(), "ans_fr".to_string()),
        ],
        vec![
            ("English Meds".to_string(), "med_en".to_string()),
            ("French Meds".to_string(), "med_fr".to_string()),
        ],
    ]
}
