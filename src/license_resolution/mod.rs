/// Domain layer - license resolution model and policies
///
/// Pure types and rules with no network or storage access.
pub mod domain;
pub mod policies;
