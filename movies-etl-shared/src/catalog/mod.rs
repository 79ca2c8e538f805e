//! Table catalog for the content schema.
//!
//! Describes every table the pipeline moves: its wire name, the mapping from
//! record fields to destination columns, the tables it references and the key
//! used to order rows during verification. The [`LoadPlan`] turns the
//! dependency information into an enforced load order.
mod plan;
mod table;

pub use plan::LoadPlan;
pub use table::{ColumnKind, ColumnSpec, Table, TableSpec};
