/// Outcome of the most recent operation.
///
/// Reset at the start of every operation and set only when a network call
/// fails. Several failures during one operation collapse into the last one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    has_error: bool,
    message: String,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reset(&mut self) {
        self.has_error = false;
        self.message.clear();
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.message = message.into();
    }
}
