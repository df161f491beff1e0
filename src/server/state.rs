//! Application state shared across handlers

use super::ServerConfig;
use crate::predict::ModelSlot;

pub struct AppState {
    pub config: ServerConfig,
    pub model: ModelSlot,
}

impl AppState {
    pub fn new(config: ServerConfig, model: ModelSlot) -> Self {
        Self { config, model }
    }
}
