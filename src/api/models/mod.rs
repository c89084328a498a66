// Models module - contains Model, ModelError, the Response envelope and change events

pub mod error;
pub mod events;
pub mod model;
pub mod response;

pub use error::{ModelError, ServiceError};
pub use events::{EventType, ModelChangeEvent, ModelEventDetail};
pub use model::Model;
pub use response::{Response, ResponseBody};
