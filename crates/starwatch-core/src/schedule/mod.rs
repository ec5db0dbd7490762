//! Occurrence projection and rotation advancement.

mod projector;
mod rotation;

pub use projector::{
    project, project_block, project_recurring, timetable, Timetable, MAX_PROJECTION_ITERATIONS,
};
pub use rotation::{
    advance, default_base_time, resolve, rotations_for, RotationPlan, RotationState,
    DEFAULT_OCCURRENCES_PER_DAY, DEFAULT_SHIFT,
};
