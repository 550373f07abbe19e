//! Document value model
//!
//! Change events carry arbitrary, loosely-typed documents. They are held as
//! `serde_json::Value` trees; this module adds the structural equality and
//! meaningfulness rules the audit trail is built on.

mod classify;
mod value;

pub use classify::{is_meaningful, is_meaningful_within, DEFAULT_MAX_DEPTH};
pub use value::{
    as_plain_object, documents_equal, optional_values_equal, render_id, values_equal, Document,
};
