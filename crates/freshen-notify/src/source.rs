use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// An error that can be dispatched on by a [`Guard`](crate::Guard).
///
/// `is_kind` may answer `true` for several kinds at once: a connection
/// failure can also be a transport failure. Guards test their arms in
/// declaration order, so the first declared kind that matches wins.
pub trait Classified: StdError {
    type Kind: Copy + fmt::Debug + Send + Sync + 'static;

    /// Stable name of the concrete failure, reported in place of a type name.
    fn kind_name(&self) -> Cow<'static, str>;

    fn is_kind(&self, kind: Self::Kind) -> bool;
}

impl Classified for std::io::Error {
    type Kind = std::io::ErrorKind;

    fn kind_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{:?}", self.kind()))
    }

    fn is_kind(&self, kind: Self::Kind) -> bool {
        self.kind() == kind
    }
}

/// Where the text of a report field comes from.
pub enum Source<E> {
    /// An empty string.
    Empty,
    Literal(Cow<'static, str>),
    /// The error's [`Classified::kind_name`].
    Name,
    /// The error's `Display` output.
    Display,
    /// The error followed by its whole `source()` chain, one cause per line.
    Chain,
    Computed(Arc<dyn Fn(&E) -> String + Send + Sync>),
}

impl<E> Source<E> {
    pub fn computed(f: impl Fn(&E) -> String + Send + Sync + 'static) -> Self {
        Source::Computed(Arc::new(f))
    }
}

impl<E: Classified> Source<E> {
    pub fn resolve(&self, err: &E) -> String {
        match self {
            Source::Empty => String::new(),
            Source::Literal(text) => text.to_string(),
            Source::Name => err.kind_name().into_owned(),
            Source::Display => err.to_string(),
            Source::Chain => chain(err),
            Source::Computed(f) => f(err),
        }
    }
}

fn chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        out.push_str("\n  caused by: ");
        out.push_str(&inner.to_string());
        cause = inner.source();
    }
    out
}

impl<E> Clone for Source<E> {
    fn clone(&self) -> Self {
        match self {
            Source::Empty => Source::Empty,
            Source::Literal(text) => Source::Literal(text.clone()),
            Source::Name => Source::Name,
            Source::Display => Source::Display,
            Source::Chain => Source::Chain,
            Source::Computed(f) => Source::Computed(f.clone()),
        }
    }
}

impl<E> fmt::Debug for Source<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Empty => f.write_str("Empty"),
            Source::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Source::Name => f.write_str("Name"),
            Source::Display => f.write_str("Display"),
            Source::Chain => f.write_str("Chain"),
            Source::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<E> From<&'static str> for Source<E> {
    fn from(text: &'static str) -> Self {
        Source::Literal(Cow::Borrowed(text))
    }
}

impl<E> From<String> for Source<E> {
    fn from(text: String) -> Self {
        Source::Literal(Cow::Owned(text))
    }
}
