pub mod question;
pub mod report;
pub mod round;
pub mod session;
pub use question::Question;
pub use report::FinalReport;
pub use round::{RoundKind, RoundResult, RoundState};
pub use session::Session;
