//! Name → constructor table that decides which collectors run.

use crate::{
    collector::{
        Collector,
        CollectorContext,
    },
    collectors,
};
use std::{
    collections::{
        BTreeMap,
        BTreeSet,
    },
    sync::Arc,
};

pub type Constructor = fn(&CollectorContext) -> Arc<dyn Collector>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("collector {0:?} is already registered")]
    Duplicate(String),
    #[error("unknown collector(s): {}", .0.join(", "))]
    Unknown(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Registration {
    name: &'static str,
    enabled_by_default: bool,
    constructor: Constructor,
}

impl Registration {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    /// An explicit override always wins over the default.
    pub fn is_enabled(&self, overrides: &BTreeMap<String, bool>) -> bool {
        overrides.get(self.name).copied().unwrap_or(self.enabled_by_default)
    }
}

/// Registered once at startup and only read afterwards.
#[derive(Debug, Default)]
pub struct CollectorRegistry {
    registrations: BTreeMap<&'static str, Registration>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in reports.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(collectors::activity::NAME, false, collectors::activity::new)?;
        registry.register(collectors::media::NAME, true, collectors::media::new)?;
        registry.register(collectors::playing::NAME, true, collectors::playing::new)?;
        registry.register(collectors::users::NAME, true, collectors::users::new)?;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: &'static str,
        enabled_by_default: bool,
        constructor: Constructor,
    ) -> Result<(), RegistryError> {
        if self.registrations.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.registrations.insert(
            name,
            Registration {
                name,
                enabled_by_default,
                constructor,
            },
        );
        Ok(())
    }

    /// All registrations, sorted by name.
    pub fn list_all(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.values()
    }

    /// Constructs every enabled collector. Overrides naming an unregistered collector are rejected.
    pub fn build(
        &self,
        overrides: &BTreeMap<String, bool>,
        context: &CollectorContext,
    ) -> Result<Vec<Arc<dyn Collector>>, RegistryError> {
        let unknown: BTreeSet<_> = overrides
            .keys()
            .filter(|name| !self.registrations.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(RegistryError::Unknown(unknown.into_iter().collect()));
        }

        let collectors = self
            .list_all()
            .filter(|registration| registration.is_enabled(overrides))
            .map(|registration| {
                info!(collector = registration.name, "enabled collector");
                (registration.constructor)(context)
            })
            .collect();
        Ok(collectors)
    }
}
