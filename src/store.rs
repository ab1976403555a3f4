//! Read access to the caller's stored kitchen: ingredients and tools.
//!
//! The pipeline never receives ingredients in the request. It reads the
//! caller's shelf for the requested domain through [`IngredientStore`] and
//! their equipment through [`ToolStore`], and enforces the minimum-shelf
//! gate before any model call. [`MemoryStore`] backs tests and embedded
//! use; production implements the traits over its own database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Domain;

/// Read access to a caller's stored ingredients.
#[async_trait]
pub trait IngredientStore: Send + Sync {
    /// List the caller's ingredients for the given domain (food shelf or
    /// drink shelf).
    async fn list_ingredients(&self, caller_id: &str, domain: Domain) -> Result<Vec<String>>;
}

/// Read access to a caller's kitchen equipment.
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// Map of tool name to availability for the caller.
    async fn list_tools(&self, caller_id: &str) -> Result<HashMap<String, bool>>;
}

/// In-memory store keyed by caller id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    food: Mutex<HashMap<String, Vec<String>>>,
    drink: Mutex<HashMap<String, Vec<String>>>,
    tools: Mutex<HashMap<String, HashMap<String, bool>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the caller's shelf for one domain.
    pub fn set_ingredients(&self, caller_id: &str, domain: Domain, items: Vec<String>) {
        let shelf = match domain {
            Domain::Food => &self.food,
            Domain::Drink => &self.drink,
        };
        shelf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(caller_id.to_string(), items);
    }

    /// Record one tool's availability for the caller.
    pub fn set_tool(&self, caller_id: &str, tool: &str, available: bool) {
        self.tools
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(caller_id.to_string())
            .or_default()
            .insert(tool.to_string(), available);
    }
}

#[async_trait]
impl IngredientStore for MemoryStore {
    async fn list_ingredients(&self, caller_id: &str, domain: Domain) -> Result<Vec<String>> {
        let shelf = match domain {
            Domain::Food => &self.food,
            Domain::Drink => &self.drink,
        };
        Ok(shelf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(caller_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ToolStore for MemoryStore {
    async fn list_tools(&self, caller_id: &str) -> Result<HashMap<String, bool>> {
        Ok(self
            .tools
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(caller_id)
            .cloned()
            .unwrap_or_default())
    }
}
