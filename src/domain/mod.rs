mod outbound_message;
mod recipient_batch;
mod recipient_email;
mod recipient_record;

pub use outbound_message::{OutboundMessage, RenderError, WELCOME_SUBJECT};
pub use recipient_batch::RecipientBatch;
pub use recipient_email::RecipientEmail;
pub use recipient_record::RecipientRecord;
