//! Change-stream record types and the store's attribute-typed JSON codec.

pub mod attribute_value;
pub mod record;

pub use attribute_value::{AttributeMap, AttributeValue, AttributeValueError};
pub use record::{ChangeBatch, ChangeKind, ChangeRecord, RawChangeBatch, StreamRecord};
