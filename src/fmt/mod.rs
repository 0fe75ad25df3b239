//! Pretty printing
//!
//! `Display` for the surface AST (as source notation) and for IR terms (as
//! s-expressions).

pub mod ir;
pub mod surface;
