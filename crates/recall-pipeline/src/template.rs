// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates for context injection.
//!
//! A template renders retrieved context plus the original prompt into the
//! final prompt sent downstream. Strength rates how forcefully the template
//! instructs the model to use the context (1 = gentle hint, 10 = explicit
//! directive).

/// A named prompt template with `{context}` and `{prompt}` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    /// How forcefully the template pushes the model to use the context,
    /// on a 1-10 scale.
    pub strength: u8,
    template: &'static str,
}

impl PromptTemplate {
    /// Render the template with the formatted context block and the
    /// original prompt.
    pub fn render(&self, context: &str, prompt: &str) -> String {
        self.template
            .replace("{context}", context)
            .replace("{prompt}", prompt)
    }

    /// The raw template text (for trace snapshots).
    pub fn text(&self) -> &'static str {
        self.template
    }
}

const BUILTIN_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "default",
        strength: 7,
        template: "You have access to the following information about the user:\n\n{context}\n\nUse this information naturally when it is relevant to the request.\n\nUser request: {prompt}",
    },
    PromptTemplate {
        name: "direct",
        strength: 9,
        template: "IMPORTANT: The following facts about the user are known to be true. Answer using them.\n\n{context}\n\nQuestion: {prompt}",
    },
    PromptTemplate {
        name: "minimal",
        strength: 3,
        template: "{context}\n\n{prompt}",
    },
];

/// The set of available templates, selected by name.
pub struct TemplateCatalog {
    templates: &'static [PromptTemplate],
}

impl TemplateCatalog {
    /// The built-in template set.
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES,
        }
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Look up a template by name, falling back to the first built-in.
    pub fn get_or_default(&self, name: &str) -> &PromptTemplate {
        self.get(name).unwrap_or(&self.templates[0])
    }

    /// Names of all templates, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name).collect()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Join retrieved entry contents into the context block a template renders.
pub fn format_context_block(contents: &[String]) -> String {
    contents
        .iter()
        .map(|content| format!("- {content}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_both_placeholders() {
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get("minimal").unwrap();
        let rendered = template.render("- I love hiking", "What are my hobbies?");
        assert_eq!(rendered, "- I love hiking\n\nWhat are my hobbies?");
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.get_or_default("nope").name, "default");
    }

    #[test]
    fn catalog_lists_all_builtins() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.names(), vec!["default", "direct", "minimal"]);
    }

    #[test]
    fn context_block_is_a_bulleted_list() {
        let block = format_context_block(&[
            "I love hiking".to_string(),
            "I work at Acme".to_string(),
        ]);
        assert_eq!(block, "- I love hiking\n- I work at Acme");
    }

    #[test]
    fn stronger_templates_have_higher_strength() {
        let catalog = TemplateCatalog::builtin();
        assert!(catalog.get("direct").unwrap().strength > catalog.get("minimal").unwrap().strength);
    }
}
