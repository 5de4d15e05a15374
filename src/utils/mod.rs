pub mod confirm;

pub use confirm::{
    confirmer, parse_answer, AssumeNo, AssumeYes, Confirm, StdinConfirm, TerminalConfirm,
};
