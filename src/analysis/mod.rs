/// Analysis layer: pure functions over (filtered) tables.
///
/// ```text
///   Table ──► ranking       top-N, StatSummary
///         ├─► distribution  counts and means per role / team
///         ├─► classify      best value, hidden gem, quadrants
///         ├─► merge         current ⋈ previous on player name
///         └─► summary       metric cards, quick stats, insights
/// ```

pub mod classify;
pub mod distribution;
pub mod merge;
pub mod ranking;
pub mod summary;
