//! BDD step definitions for the band site

pub mod next_show_steps;
pub mod query_steps;
