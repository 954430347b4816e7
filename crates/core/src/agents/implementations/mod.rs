//! Concrete agent types.

pub mod business_intelligence;
pub mod mock_agent;
pub mod system_architecture;

pub use business_intelligence::BusinessIntelligence;
pub use mock_agent::MockBehavior;
pub use system_architecture::SystemArchitecture;
