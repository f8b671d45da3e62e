// Market intelligence — catalog lookup, demand scoring, and per-student
// role analysis. Pure reads over the static dataset; no narrator calls here.

pub mod analysis;
pub mod catalog;
