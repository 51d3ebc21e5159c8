//! Tournament business logic: bracket building, round advancement, lifecycle, results.

pub mod advancer;
pub mod builder;
pub mod enrollment;
pub mod lifecycle;
pub mod queries;
pub mod results;

pub use advancer::{advance_round, Advance};
pub use builder::{bracket_size, build_bracket};
pub use enrollment::{
    enroll, participant_enrollments, set_enrollment_state, tournament_enrollments, withdraw,
};
pub use lifecycle::{authorize, create_tournament, delete_tournament};
pub use queries::{bracket, champion, history, next_match, BracketView};
pub use results::{record_result, start_match};
