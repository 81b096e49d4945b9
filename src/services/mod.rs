pub mod token_service;
pub use token_service::{Claims, TokenError, TokenService};

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, TokenResponse};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod import_service;
pub use import_service::{BatchReport, FileSummary, ImportError, ImportService, UploadedFile};

pub mod import_service_impl;
pub use import_service_impl::SpreadsheetImportService;
