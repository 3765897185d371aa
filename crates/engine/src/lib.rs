pub mod escalation;
pub mod risk;

pub use escalation::EscalationPolicy;
pub use risk::RiskAssessor;
