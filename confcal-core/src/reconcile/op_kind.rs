use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

impl OpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            OpKind::Create => "+",
            OpKind::Update => "~",
            OpKind::Delete => "-",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
