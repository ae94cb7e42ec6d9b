//! State shared by every request handler
use crate::catalog::Catalog;

pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}
