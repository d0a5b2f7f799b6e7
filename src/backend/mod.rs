//! Alien backend boundary
//!
//! The backend owns the LLM, speech and output decisions. This module only
//! speaks its HTTP protocol and normalises the reply shapes into
//! [`AlienUpdate`]s for the application state.

pub mod client;
pub mod models;
pub mod poller;

pub use client::{AlienBackend, HttpBackend};
pub use models::{
    split_parameter_block, AlienRequest, AlienUpdate, BackendReply, ChatReply, PersonalityPatch,
    StateReply, TextRequest,
};
pub use poller::{PollOutcome, Poller, SequenceGate};
