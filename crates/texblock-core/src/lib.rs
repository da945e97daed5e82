#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the texblock project.

Do NOT depend on this crate directly.
Use `texblock-io` instead.
"#]

pub mod escape;
pub mod model;
pub mod sanitize;
