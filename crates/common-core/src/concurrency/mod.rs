pub mod cancellation;
pub mod parallel;

pub use cancellation::CancellationContext;
pub use parallel::{run, run_with_default};
