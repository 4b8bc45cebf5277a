//! Data models for roster and advancement records.
//!
//! - `Scout`, `Adult`: roster members keyed by BSA number
//! - `ScoutRank`, `ActivityStatus`: enumerated roster values
//! - `MeritBadgeProgress`: per-scout, per-badge progress with parsed requirements
//! - `ScoutPosition`: leadership positions parsed from the youth roster

pub mod advancement;
pub mod person;
pub mod position;

pub use advancement::{
    parse_requirements, split_badge_year, CounselorAssignment, MeritBadgeProgress,
    RequirementEntry, RequirementStatus,
};
pub use person::{ActivityStatus, Adult, Scout, ScoutRank};
pub use position::{parse_positions, ScoutPosition};
