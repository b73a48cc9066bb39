use serde::{Deserialize, Serialize};

/// An instruction sent to a generation provider, with a `{{text}}`
/// placeholder marking where the user's text goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub instruction: String,
    /// Ask the provider for a JSON body instead of free text.
    #[serde(default)]
    pub json_response: bool,
}

impl PromptTemplate {
    pub const PLACEHOLDER: &'static str = "{{text}}";

    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            json_response: false,
        }
    }

    pub fn with_json_response(mut self, json_response: bool) -> Self {
        self.json_response = json_response;
        self
    }

    /// Substitute `text` into the instruction. Templates without a
    /// placeholder get the text appended after a blank line.
    pub fn render(&self, text: &str) -> String {
        if self.instruction.contains(Self::PLACEHOLDER) {
            self.instruction.replace(Self::PLACEHOLDER, text)
        } else {
            format!("{}\n\n{}", self.instruction, text)
        }
    }
}
