//! Trust policy synthesis (deterministic JSON generation)

pub mod trust_policy;

pub use trust_policy::build_trust_policy;
