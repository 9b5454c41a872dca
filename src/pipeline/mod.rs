//! Pipeline stages for plant analysis.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ report::render
//! (file)    (base64)   (Gemini)  (Document)
//! ```
//!
//! 1. [`input`]  — read the selected image, check size and container format
//! 2. [`encode`] — base64-wrap the bytes for the JSON request body
//! 3. [`llm`]    — one `generateContent` call; the only stage with network I/O

pub mod encode;
pub mod input;
pub mod llm;
