//! Reads session records off a conference agenda page.

mod parse;
mod source;

pub use parse::parse_agenda;
pub use source::AgendaSource;
