pub mod email;
pub mod format;

pub use email::EmailNotifier;
pub use format::{body, subject};

use crate::error::Result;

/// Outbound delivery of a fired alert.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}
