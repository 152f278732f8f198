//! Core data types: quotes, tracked symbols and the result table.

pub mod quote;
pub mod symbol;
pub mod table;

pub use quote::*;
pub use symbol::*;
pub use table::*;
