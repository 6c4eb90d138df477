/// Producer identifier reserved for entries the server generates about
/// itself. Never auto-registered and never offered as a filter option.
pub const INTERNAL_PRODUCER: &str = "Internal";
