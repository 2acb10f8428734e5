mod job;
pub mod negotiator;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

pub use job::{JobKind, JobSpec, RequestShape, ShapePlan};
pub use poller::{Transition, settle, wait_for_terminal};
