//! Cross-crate tests: subnet selection, scanning and serving wired together.

mod api;
mod discovery;
