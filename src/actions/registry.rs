//! Keyword-indexed action constructors
//!
//! The parser looks every action keyword up here. Built-in actions register
//! themselves through their module's `register` function; embedders may add
//! their own constructors to the process-wide registry with [`register`].

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use super::error::ActionError;
use super::param::ParameterList;
use super::{axis, button, mode, register_none, ActionRef};

/// Builds an action from its keyword and parameters
pub type Constructor = fn(&str, &ParameterList) -> Result<ActionRef, ActionError>;

/// Map from action keyword to constructor
#[derive(Clone, Default)]
pub struct ActionRegistry {
    constructors: HashMap<String, Constructor>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keywords: Vec<&str> = self.keywords().collect();
        keywords.sort_unstable();
        f.debug_struct("ActionRegistry")
            .field("keywords", &keywords)
            .finish()
    }
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in action
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_none(&mut registry);
        button::register(&mut registry);
        axis::register(&mut registry);
        mode::register(&mut registry);
        registry
    }

    /// Register `constructor` under `keyword`, returning the one it replaced
    pub fn register(&mut self, keyword: &str, constructor: Constructor) -> Option<Constructor> {
        let previous = self.constructors.insert(keyword.to_string(), constructor);
        if previous.is_some() {
            warn!("Action constructor for '{}' replaced", keyword);
        } else {
            debug!("Registered action '{}'", keyword);
        }
        previous
    }

    pub fn get(&self, keyword: &str) -> Option<Constructor> {
        self.constructors.get(keyword).copied()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.constructors.contains_key(keyword)
    }

    /// Registered keywords, in no particular order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(|k| k.as_str())
    }

    /// Construct the action registered under `keyword`
    pub fn construct(
        &self,
        keyword: &str,
        params: &ParameterList,
    ) -> Result<ActionRef, ActionError> {
        match self.get(keyword) {
            Some(constructor) => constructor(keyword, params),
            None => Err(ActionError::UnknownKeyword(keyword.to_string())),
        }
    }
}

/// Process-wide registry used by [`parse_action`](super::parse_action)
static GLOBAL_REGISTRY: Lazy<RwLock<ActionRegistry>> =
    Lazy::new(|| RwLock::new(ActionRegistry::with_builtins()));

/// Register a constructor in the process-wide registry
pub fn register(keyword: &str, constructor: Constructor) -> Option<Constructor> {
    GLOBAL_REGISTRY.write().register(keyword, constructor)
}

/// Construct through the process-wide registry
///
/// The lock is released before the constructor runs, so constructors may
/// themselves parse or register actions.
pub fn construct(keyword: &str, params: &ParameterList) -> Result<ActionRef, ActionError> {
    let constructor = GLOBAL_REGISTRY.read().get(keyword);
    match constructor {
        Some(constructor) => constructor(keyword, params),
        None => Err(ActionError::UnknownKeyword(keyword.to_string())),
    }
}

/// Whether the process-wide registry knows `keyword`
pub fn is_registered(keyword: &str) -> bool {
    GLOBAL_REGISTRY.read().contains(keyword)
}
