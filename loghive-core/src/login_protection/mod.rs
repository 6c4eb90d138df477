mod guard;
mod throttle;

pub use guard::{InjectionDetected, InjectionGuard};
pub use throttle::{LoginOutcome, LoginThrottle};
