//! Lead and company models
//!
//! Application-side field names are camelCase on the wire; the record store
//! uses snake_case columns (see [`crate::db`]).

mod company;
mod lead;

pub use company::{Company, CompanyInput, CountValue, Firmographics, NewCompany};
pub use lead::{append_link_note, Lead, LeadInput, LinkedLead, NewLead};
