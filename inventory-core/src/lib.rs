//! Request-independent logic behind the inventory dashboard: the records the
//! remote inventory service speaks, the route guard decision table, form
//! validation, and the reshaping done for the filter widget and charts.

pub mod models;
pub mod auth_gate;
pub mod validation;
pub mod dates;
pub mod filter;
pub mod charts;
pub mod encoding;

pub use auth_gate::{evaluate, safe_return_path, GateDecision};
pub use models::{
    AllocationRecord, AllocationUpdate, Credentials, Location, NewAllocation, PersonQuery,
    RemoteStatus, SerialLookup, StockDevice, StockField,
};
pub use validation::FieldErrors;
