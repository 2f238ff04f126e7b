use std::fmt::Write;

use contract_spec::{
    AnswerSet, AnswerType, QuestionDescriptor, RenderPayload, SectionProgress, SideEffect,
    render::value_to_display,
};
use serde_json::Value;

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: section headers and question prompts only.
    Clean,
    /// Verbose output: status, visible questions, error details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and summaries while the wizard walks the sections.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, title: &str, description: Option<&str>) {
        if self.header_printed {
            return;
        }
        println!("Contract: {}", title);
        if self.verbosity.is_verbose()
            && let Some(description) = description
        {
            println!("{}", description);
        }
        println!("Type 'back' to return to the previous section or 'exit' to stop.");
        self.header_printed = true;
    }

    pub fn show_section(&self, payload: &RenderPayload) {
        println!();
        println!(
            "== {}/{} {} ==",
            payload.section_index + 1,
            payload.section_count,
            payload.section_title
        );
        if let Some(description) = &payload.section_description {
            println!("{}", description);
        }
        if self.verbosity.is_verbose() {
            println!(
                "Status: {} ({}/{})",
                payload.status.as_str(),
                payload.progress.answered,
                payload.progress.total
            );
        }
    }

    pub fn show_narrative(&self, text: &str) {
        println!("{}", text);
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = if prompt.total > 0 {
            format!("{}/{} {}", prompt.index, prompt.total, prompt.title)
        } else {
            format!("{} {}", prompt.index, prompt.title)
        };
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(current) = &prompt.current {
            println!("Current answer: {} (press enter to keep)", current);
        }
        for (position, (value, label)) in prompt.options.iter().enumerate() {
            if self.verbosity.is_verbose() {
                println!("  {}. {} [{}]", position + 1, label, value);
            } else {
                println!("  {}. {}", position + 1, label);
            }
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_side_effects(&self, effects: &[SideEffect]) {
        for effect in effects {
            println!("Next step: {} ({})", effect.target, effect.action);
        }
    }

    pub fn show_completion(&self, answer_set: &AnswerSet) {
        println!("Done ✅");
        match answer_set.to_cbor() {
            Ok(bytes) => {
                println!("Answers (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize answers to CBOR: {}", err);
            }
        }
        if self.show_answers_json {
            match answer_set.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize answers to JSON: {}", err);
                }
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub required: bool,
    pub hint: Option<String>,
    pub current: Option<String>,
    pub options: Vec<(String, String)>,
}

impl PromptContext {
    pub fn new(
        question: &QuestionDescriptor,
        prompt: String,
        progress: &SectionProgress,
        current: Option<&Value>,
    ) -> Self {
        Self {
            index: (progress.answered + 1).min(progress.total.max(1)),
            total: progress.total,
            title: prompt,
            required: question.is_required(),
            hint: question.answer_type.and_then(hint_for),
            current: current.map(value_to_display),
            options: question
                .options
                .iter()
                .map(|option| (option.value.clone(), option.label.clone()))
                .collect(),
        }
    }
}

fn hint_for(kind: AnswerType) -> Option<String> {
    let hint = match kind {
        AnswerType::Boolean | AnswerType::ReferralLink => "(yes/no)",
        AnswerType::Number => "(number)",
        AnswerType::Currency => "(amount, e.g. 250000 or $1,500.50)",
        AnswerType::Phone => "(e.g. 555-123-4567)",
        AnswerType::Date => "(YYYY-MM-DD)",
        AnswerType::SingleSelect => "(number or value)",
        AnswerType::Text => return None,
    };
    Some(hint.to_string())
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut encoded, "{:02x}", byte);
    }
    encoded
}
