//! Data access: statement execution, the generic repository, and per-entity services.

mod crud;
mod entitlements;
mod products;
mod repository;
mod resources;

pub use crud::CrudService;
pub use entitlements::EntitlementService;
pub use products::ProductService;
pub use repository::Repository;
pub use resources::ResourceService;

use crate::error::AppError;

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(())
}

/// Map a zero-row soft delete to NotFound.
fn deleted(affected: u64, label: &str) -> Result<(), AppError> {
    if affected == 0 {
        return Err(AppError::NotFound(label.to_string()));
    }
    Ok(())
}
