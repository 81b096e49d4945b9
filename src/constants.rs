pub mod roles {

    pub const ADMIN: i32 = 1;

    pub const STANDARD: i32 = 2;
}

pub mod reservation_status {

    pub const PENDING: i32 = 1;

    pub const CONFIRMED: i32 = 2;

    pub const CANCELLED: i32 = 3;

    pub const COMPLETED: i32 = 4;

    #[must_use]
    pub const fn is_valid(id: i32) -> bool {
        id >= PENDING && id <= COMPLETED
    }
}

pub mod import {
    use std::time::Duration;

    pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx"];

    pub const MAX_FILES_PER_BATCH: usize = 5;

    pub const MAX_FILE_SIZE_BYTES: usize = 5 * 1024 * 1024;

    /// Budget for the single-file call path.
    pub const FILE_TIME_BUDGET: Duration = Duration::from_secs(180);

    /// Budget for the batch endpoint.
    pub const BATCH_TIME_BUDGET: Duration = Duration::from_secs(240);

    pub const MAX_ERRORS_PER_FILE: usize = 10;
}
