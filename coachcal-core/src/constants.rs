/// Days shown after the start date when no end is given
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Length of a converted todo when the drop gives no end time
pub const DEFAULT_SLOT_MINUTES: i64 = 60;

/// Granularity of drop targets on day and week grids
pub const SLOT_STEP_MINUTES: u32 = 30;
