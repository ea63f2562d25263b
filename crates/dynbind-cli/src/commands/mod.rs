//! Subcommand implementations

pub mod call;
pub mod export;
pub mod info;
pub mod list;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dynbind_engine::{Dispatcher, EngineConfig, Reflector, TypeCatalog};
use dynbind_sample::SampleModel;

/// Built catalog of the sample model plus a dispatcher over it
pub struct Session {
    pub config: EngineConfig,
    pub model: SampleModel,
    pub dispatcher: Dispatcher,
}

impl Session {
    /// Load configuration, register the sample model and build its catalog
    pub fn open(config_path: Option<&Path>, forward_refs: bool) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => EngineConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => EngineConfig::default(),
        };
        config.apply_env()?;
        config.build.resolve_forward_references |= forward_refs;
        Self::with_config(config)
    }

    /// Build a session from an explicit configuration
    pub fn with_config(config: EngineConfig) -> anyhow::Result<Self> {
        let model = SampleModel::new();
        let reflector = Arc::new(Reflector::with_options(config.build.clone()));
        reflector.build(Some(&model.registry))?;
        let dispatcher = Dispatcher::with_options(reflector, config.dispatch.clone());
        Ok(Session {
            config,
            model,
            dispatcher,
        })
    }

    /// The published catalog
    pub fn catalog(&self) -> anyhow::Result<Arc<TypeCatalog>> {
        self.dispatcher
            .reflector()
            .catalog()
            .context("Catalog is not built")
    }
}
