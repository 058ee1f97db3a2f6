/// Mail relay implementation of the notification service.
pub mod service;

pub use service::{MailError, MailNotificationService};
