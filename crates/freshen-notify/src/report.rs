use std::fmt;

/// A structured failure notification.
///
/// Reports are fire-and-forget: a sink receives them once and nothing is
/// read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Machine-readable failure category, e.g. `cacheConnection`.
    pub category: String,
    /// Human-readable summary.
    pub message: String,
    /// Optional extra information, e.g. the underlying error text.
    pub detail: Option<String>,
}

impl ErrorReport {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}
