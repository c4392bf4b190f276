/*!
 * Prompt templates for unit translation.
 *
 * Templates carry `{source_language}`, `{target_language}` and `{text}`
 * placeholders. Languages are substituted first and the text last, so source
 * text that happens to contain a placeholder name is sent verbatim.
 */

/// Prompt template with language and text placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default user prompt.
    pub const DEFAULT_USER_PROMPT: &'static str =
        "Translate the following text from {source_language} into {target_language}.\n\n{text}\n\n{target_language}:";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default user prompt template.
    pub fn user_default() -> Self {
        Self::new(Self::DEFAULT_USER_PROMPT)
    }

    /// Whether the template is blank.
    pub fn is_empty(&self) -> bool {
        self.template.trim().is_empty()
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str, text: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .replace("{text}", text)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::user_default()
    }
}

/// Builder for the system and user prompts of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPromptBuilder {
    source_language: String,
    system_prompt: PromptTemplate,
    user_prompt: PromptTemplate,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder with the default templates and no system prompt.
    pub fn new(source_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            system_prompt: PromptTemplate::new(""),
            user_prompt: PromptTemplate::user_default(),
        }
    }

    /// Set the system prompt template.
    pub fn with_system_prompt(mut self, template: &str) -> Self {
        self.system_prompt = PromptTemplate::new(template);
        self
    }

    /// Set the user prompt template. A blank template keeps the default.
    pub fn with_user_prompt(mut self, template: &str) -> Self {
        let template = PromptTemplate::new(template);
        if !template.is_empty() {
            self.user_prompt = template;
        }
        self
    }

    /// Build the system prompt; empty when none is configured.
    pub fn build_system_prompt(&self, target_language: &str) -> String {
        if self.system_prompt.is_empty() {
            return String::new();
        }
        self.system_prompt
            .render(&self.source_language, target_language, "")
    }

    /// Build the user prompt for `text`.
    pub fn build_user_prompt(&self, text: &str, target_language: &str) -> String {
        self.user_prompt
            .render(&self.source_language, target_language, text)
    }

    /// Build both prompts.
    pub fn build(&self, text: &str, target_language: &str) -> (String, String) {
        (
            self.build_system_prompt(target_language),
            self.build_user_prompt(text, target_language),
        )
    }
}

impl Default for TranslationPromptBuilder {
    fn default() -> Self {
        Self::new("English")
    }
}
