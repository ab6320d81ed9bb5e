//! Complex-span working memory task.
//!
//! The library holds the engine: item sources, scoring, the phase automata
//! and the dispatcher that chains them. The terminal front end in `main.rs`
//! implements [`host::Host`] and feeds key presses and timer expiries in.

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod items;
pub mod session;
pub mod store;
