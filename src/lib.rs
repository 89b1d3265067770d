pub mod api;
pub mod appsettings;
pub mod clock;
pub mod recurrence;
pub mod reminder;
pub mod reminder_request;
pub mod storage;
