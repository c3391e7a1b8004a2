pub mod manager;
pub mod procedure;

pub use manager::{Database, DatabaseError, FunctionArg, StoredFunctions};
pub use procedure::ProcedureResult;
