// Adapters layer: concrete implementations for external systems (filesystem, mail relay).

pub mod smtp;
pub mod storage;

pub use smtp::SmtpMailer;
pub use storage::LocalStorage;
