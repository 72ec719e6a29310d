//! HTTP API handlers for copilot-api

pub mod calls;
pub mod companies;
pub mod enrichment;
mod extract;
pub mod health;
pub mod import;
pub mod leads;
pub mod news;
pub mod outreach;

pub use calls::call_routes;
pub use companies::company_routes;
pub use enrichment::enrichment_routes;
pub use extract::ValidJson;
pub use health::health_routes;
pub use import::import_routes;
pub use leads::lead_routes;
pub use news::news_routes;
pub use outreach::outreach_routes;
