//! Prompt templates for Aide.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub knowledge: KnowledgePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant with access to a set of tools.

Think about what the user needs, then call the tools that help you answer.
Available tools: {{tool_names}}

Guidelines:
- Use the calculator tools for any arithmetic instead of computing in your head
- Call tools one step at a time when a later step depends on an earlier result
- Use 'query_knowledge_base' for questions about the user's indexed documents
- Use 'store_memory' and 'retrieve_memory' for facts the user asks you to remember
- When you have enough information, give a short, direct final answer"#
                .to_string(),
        }
    }
}

/// Prompts for knowledge base answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgePrompts {
    pub system: String,
    pub user: String,
}

impl Default for KnowledgePrompts {
    fn default() -> Self {
        Self {
            system: r#"You answer questions using excerpts from the user's document collection.

Guidelines:
- Answer using only the provided excerpts
- Cite sources with the format [Source Title]
- If the excerpts do not contain the answer, say so clearly
- Be concise"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant excerpts from the knowledge base:

{{context}}

Please answer the question based on the above excerpts."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let knowledge_path = custom_path.join("knowledge.toml");
            if knowledge_path.exists() {
                let content = std::fs::read_to_string(&knowledge_path)?;
                prompts.knowledge = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a template, letting `vars` override the configured custom variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The agent system prompt with the offered tool names filled in.
    pub fn agent_system(&self, tool_names: &[&str]) -> String {
        let mut vars = HashMap::new();
        vars.insert("tool_names".to_string(), tool_names.join(", "));
        self.render_with_custom(&self.agent.system, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_agent_system_lists_tools() {
        let prompts = Prompts::default();
        let system = prompts.agent_system(&["add", "multiply"]);
        assert!(system.contains("Available tools: add, multiply"));
        assert!(!system.contains("{{tool_names}}"));
    }

    #[test]
    fn test_custom_dir_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("agent.toml"),
            "system = \"You are {{persona}}.\"\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("persona".to_string(), "terse".to_string());
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        assert_eq!(prompts.agent_system(&[]), "You are terse.");
        assert!(prompts.knowledge.user.contains("{{question}}"));
    }
}
