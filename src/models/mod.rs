//! Colony domain models.
//!
//! Provides the entities of the one-to-one allocation problem and the
//! flat snapshot used to record an allocation.
//!
//! # Domain Mappings
//!
//! | u-colony | Housing | Scheduling | Classroom |
//! |----------|---------|------------|-----------|
//! | Settler | Tenant | Worker | Student |
//! | Resource | Flat | Shift | Seat |
//! | Adversary | Feuding neighbour | Rival | Disruptive pair |

mod resource;
mod settler;
mod snapshot;

pub use resource::Resource;
pub use settler::Settler;
pub use snapshot::AllocationSnapshot;
