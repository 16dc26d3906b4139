//! Output generation for run results.
//!
//! One structured JSON document is written per run: aggregate counts plus
//! the full ordered list of per-source results. Before writing, every
//! timestamp-typed value anywhere in the document, including arbitrarily
//! nested payload values produced by individual sources, is rewritten to
//! one canonical sortable textual form.

pub mod json;
