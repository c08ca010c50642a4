//! Query layer - access-path routing and pagination for list queries

pub mod paginate;
pub mod router;

pub use paginate::{paginate, Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use router::{AppConfigFilter, AppFilter, ListPlan, ThreadFilter};
