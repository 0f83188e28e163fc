//! CrudService: generic create / read / list using the safe SQL builder.

mod crud;
pub use crud::CrudService;
