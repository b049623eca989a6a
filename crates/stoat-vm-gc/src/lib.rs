//! # Stoat VM Cyclic Garbage Collector
//!
//! Incremental cyclic garbage collection for the Stoat VM's shared,
//! atomically-swapped reference cells. The VM reclaims ordinary objects by
//! per-object reference counting; cycles through atomic references never
//! locally reach zero and are reclaimed here instead.
//!
//! ## Design
//!
//! - **Atomic rootset**: the host enumerates every live atomic-reference
//!   object at the start of a cycle with its per-reference lock held,
//!   freezing the closure's topology for the walk
//! - **Inner-count accounting**: a transitive-closure walk counts, per
//!   candidate, the references arriving from inside the closure; a
//!   candidate whose inner count equals its actual refcount receives no
//!   external references
//! - **Worker rendezvous**: delayed reference counting keeps stack
//!   references out of refcounts, so every alive worker contributes its
//!   stack accounting through a rendezvous barrier before the engine
//!   compares counts
//! - **Deferred reclamation**: the engine only schedules slot zeroing; the
//!   zeroing itself (and the host's release cascade it triggers) runs on a
//!   worker thread at the next rendezvous
//!
//! The engine runs on a dedicated background thread so rendezvous calls
//! stay short. [`CyclicCollector`] is the first-class collector value;
//! [`api`] wraps the process-wide instance the runtime talks to.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod api;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
mod rendezvous;
mod roots;
mod trigger;

pub use collector::CyclicCollector;
pub use config::CollectorConfig;
pub use engine::GcStats;
pub use error::CycleGcError;
pub use host::{ObjectRef, RuntimeHost, Slot, WorkerId};
