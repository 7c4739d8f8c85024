//! Associate module
//!
//! Cooperative member records, the create/edit form and list search.

mod filter;
mod form;
mod model;

pub use filter::filter_associates;
pub use form::{AmountInput, AssociateForm, EmploymentForm, FinancialForm};
pub use model::*;
