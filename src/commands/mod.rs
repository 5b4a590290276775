pub mod locations;
pub mod ttp;

// Re-export command functions for convenience
pub use locations::locations;
pub use ttp::ttp;
