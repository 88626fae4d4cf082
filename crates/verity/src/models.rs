//! These models represent the objects passed around by the orchestrator
//!
//! There are two related formats we need to interact with:
//! - chat messages, sent from the interface to the server as `{role, content}` pairs
//! - model turns, sent from the orchestrator to the LLM, which also carry the hidden
//!   fact-check invocation and its result
//!
//! Incoming messages are converted into turns immediately; the provider is responsible for
//! the translation from turns into its own wire format.
pub mod message;
pub mod role;
pub mod stream;
pub mod tool;
pub mod turn;
