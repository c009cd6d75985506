//! Customer chat: message log, case lifecycle, and backend synchronization

pub mod message;
pub mod notice;
pub mod order_id;
pub mod photo;
pub mod poller;
pub mod status;
pub mod synchronizer;

pub use message::{Message, MessageLog, Origin};
pub use notice::{Notice, NoticeLevel};
pub use order_id::normalize_order_id;
pub use poller::{CaseWatch, DEFAULT_POLL_INTERVAL};
pub use status::CaseStatus;
pub use synchronizer::{PollOutcome, SendOutcome, SendRejection, Synchronizer};
