use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything needed to describe one merge
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InsertOptions {
    // Input
    pub base_file: Option<PathBuf>,
    pub source_file: Option<PathBuf>,

    // Source page selection, e.g. "1-3,7" or "all"
    pub pages: String,

    // Base positions, e.g. "2,mid,end"
    pub positions: String,

    pub policy: InsertionPolicy,

    // Empty `pages` selects the whole source document
    pub select_all_on_empty: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            base_file: None,
            source_file: None,
            pages: String::new(),
            positions: String::new(),
            policy: InsertionPolicy::Replace,
            select_all_on_empty: true,
        }
    }
}

impl InsertOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| InsertError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| InsertError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.base_file.is_none() {
            return Err(InsertError::Config("No base file specified".to_string()));
        }
        if self.source_file.is_none() {
            return Err(InsertError::Config("No source file specified".to_string()));
        }
        Ok(())
    }

    /// Overwrite the selection, positions and policy with a preset
    pub fn with_quick_action(mut self, action: QuickAction) -> Self {
        action.apply(&mut self);
        self
    }
}

/// One-click presets for common merges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    /// Source page 1 replaces base page 1
    ReplaceFirstPage,
    /// Source pages 1-3 go before the middle of the base document
    InsertAtMiddle,
    /// Every source page goes after the last base page
    AppendAll,
}

impl QuickAction {
    pub fn label(self) -> &'static str {
        match self {
            QuickAction::ReplaceFirstPage => "Replace First Page",
            QuickAction::InsertAtMiddle => "Insert at Middle",
            QuickAction::AppendAll => "Append All",
        }
    }

    /// Selection, positions and policy this preset stands for
    pub fn settings(self) -> (&'static str, &'static str, InsertionPolicy) {
        match self {
            QuickAction::ReplaceFirstPage => ("1", "1", InsertionPolicy::Replace),
            QuickAction::InsertAtMiddle => ("1-3", "mid", InsertionPolicy::InsertBefore),
            QuickAction::AppendAll => ("all", "", InsertionPolicy::Append),
        }
    }

    /// Write this preset into `options`, leaving the file paths alone
    pub fn apply(self, options: &mut InsertOptions) {
        let (pages, positions, policy) = self.settings();
        options.pages = pages.to_string();
        options.positions = positions.to_string();
        options.policy = policy;
    }
}
