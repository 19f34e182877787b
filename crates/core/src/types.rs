/// Training iteration number as recorded in event logs.
pub type Step = i64;

/// All wall-clock timestamps printed by the tools are local time.
pub type Timestamp = chrono::DateTime<chrono::Local>;
