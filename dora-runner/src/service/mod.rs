//! Service layer
//!
//! Services contain the side-effecting work a deployment cycle delegates:
//! producing a change in a local clone and landing it through GitHub.
//!
//! Services are trait-based so the scheduler can be tested without git.

mod change;
mod git;

// Re-export traits
pub use change::ChangeService;

// Re-export implementations
pub use change::GitChangeService;
