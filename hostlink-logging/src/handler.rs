//! Log handler for module logging.
//!
//! This module provides types for handling logs raised by module code.

use hostlink_host::{CallbackRegistry, CallbackType};

use crate::operation::LogOperation;

/// Function type for handling log operations
pub type LogHandler = Box<dyn Fn(LogOperation) + Send + Sync>;

/// Extension trait for `CallbackRegistry` to add logging-specific methods
pub trait LoggingExt {
    /// Register a log handler
    fn register_log_handler<F>(&mut self, handler: F)
    where
        F: Fn(LogOperation) + Send + Sync + 'static;

    /// Handle a log operation, forwarding it to the `log` facade under
    /// `target` when no handler is registered
    fn handle_log_or_forward(&self, operation: LogOperation, target: &str);
}

impl LoggingExt for CallbackRegistry {
    fn register_log_handler<F>(&mut self, handler: F)
    where
        F: Fn(LogOperation) + Send + Sync + 'static,
    {
        self.register_callback(CallbackType::Logging, Box::new(handler) as LogHandler);
    }

    fn handle_log_or_forward(&self, operation: LogOperation, target: &str) {
        if let Some(handler) = self.get_callback::<LogHandler>(&CallbackType::Logging) {
            handler(operation);
        } else {
            forward_to_facade(&operation, target);
        }
    }
}

/// Emit a log operation through the `log` facade
pub fn forward_to_facade(operation: &LogOperation, target: &str) {
    let level = operation.level.to_log_level();
    match &operation.component_id {
        Some(component) => log::log!(target: target, level, "[{component}] {}", operation.message),
        None => log::log!(target: target, level, "{}", operation.message),
    }
}
