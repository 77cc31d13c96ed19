//! Tooling primitives for goal-oriented action planning.
//!
//! This crate is intentionally lightweight and engine-agnostic. Inspectors and debug drawing
//! belong in host-specific adapter crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    LogTraceSink, NullTraceSink, TraceEvent, TraceLog, TraceSink, Tracer, VecTraceSink,
};
