//! Tool registry for managing available tools.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::tools::tool::{Tool, ToolSchema};

/// Registry of available tools.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.write().await.insert(name.clone(), tool);
        tracing::debug!("Registered tool: {}", name);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// Check if a tool exists.
    pub async fn has(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }

    /// List all tool names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all tools.
    pub async fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.read().await.values().cloned().collect()
    }

    /// Schemas for every registered tool, sorted by name.
    pub async fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .read()
            .await
            .values()
            .map(|tool| tool.schema())
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolSettings;
    use crate::testing::stub_services;
    use crate::tools::slides::register_slides_tools;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = ToolRegistry::new();
        let (services, _, _, _) = stub_services();
        register_slides_tools(&registry, services, ToolSettings::default()).await;

        let names = registry.list().await;
        assert_eq!(
            names,
            vec![
                "add_image",
                "copy_presentation",
                "create_presentation",
                "delete_objects",
                "export_pdf",
                "list_comments",
                "modify_image",
                "modify_video",
                "replace_image",
                "search_text",
                "set_transition",
                "translate_presentation",
            ]
        );
        assert!(registry.has("search_text").await);
        assert!(registry.get("nope").await.is_none());
        assert_eq!(registry.all().await.len(), 12);

        let schemas = registry.schemas().await;
        assert_eq!(schemas[0].name, "add_image");
        assert!(
            schemas
                .iter()
                .all(|s| s.parameters["type"] == serde_json::json!("object"))
        );
    }
}
