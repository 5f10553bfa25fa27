/// Minimum notice, in hours, before an appointment can still be rescheduled.
pub const MIN_RESCHEDULE_NOTICE_HOURS: i64 = 24;

/// Window used for "new booking" and "upcoming appointment" notifications.
pub const NOTIFICATION_WINDOW_HOURS: i64 = 24;

/// A contact phone needs at least this many digits.
pub const MIN_PHONE_DIGITS: usize = 8;

/// Duration assigned to a service that has no time modules.
pub const DEFAULT_SERVICE_DURATION: u32 = 60;

/// Current version of the persisted collection documents.
pub const SCHEMA_VERSION: u32 = 2;

pub const DEFAULT_SERVICE_IMAGE: &str =
    "https://images.unsplash.com/photo-1544161515-4ab6ce6db874";
