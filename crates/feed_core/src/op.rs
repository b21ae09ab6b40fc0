use std::fmt;

/// The three consumer-facing operations of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitialLoad,
    LoadMore,
    Refresh,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::InitialLoad => write!(f, "initial load"),
            Operation::LoadMore => write!(f, "load more"),
            Operation::Refresh => write!(f, "refresh"),
        }
    }
}
