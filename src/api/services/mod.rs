//! Services module - contains the model CRUD store and the change-event pipeline.

pub mod change_event_translator;
pub mod model_store;
pub mod stream_dispatcher;

// Re-export for convenience
pub use change_event_translator::{ChangeEventTranslator, TranslationError};
pub use model_store::ModelStore;
pub use stream_dispatcher::StreamDispatcher;
