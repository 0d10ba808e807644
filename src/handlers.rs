pub mod eligibility;
pub mod requirements;
pub mod scheduling;
