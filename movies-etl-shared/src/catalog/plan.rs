use crate::catalog::Table;
use crate::errors::PlanError;

/// Ordered list of tables to load.
///
/// A plan can only be built if every table comes after the tables it
/// references, so junction rows never reach the destination before the
/// entities they point to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    tables: Vec<Table>,
}

impl LoadPlan {
    /// Validates and creates a load plan.
    ///
    /// # Arguments
    ///
    /// * `tables` - Tables in the order they should be loaded
    ///
    /// # Returns
    ///
    /// * `Ok(LoadPlan)` - Every dependency precedes its dependants
    /// * `Err(PlanError)` - A table is repeated, a dependency is missing, or the order is wrong
    pub fn new(tables: Vec<Table>) -> Result<Self, PlanError> {
        for (position, table) in tables.iter().enumerate() {
            if tables[..position].contains(table) {
                return Err(PlanError::Duplicate(*table));
            }

            for dependency in table.spec().depends_on {
                match tables.iter().position(|t| t == dependency) {
                    None => {
                        return Err(PlanError::MissingDependency {
                            table: *table,
                            dependency: *dependency,
                        });
                    }
                    Some(dep_position) if dep_position > position => {
                        return Err(PlanError::OutOfOrder {
                            table: *table,
                            dependency: *dependency,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

impl Default for LoadPlan {
    /// Entities first, then the junction tables that reference them.
    fn default() -> Self {
        Self {
            tables: Table::ALL.to_vec(),
        }
    }
}
