use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::report::ErrorReport;
use crate::sink::Notifier;
use crate::source::{Classified, Source};

/// What a guard does with an error it caught: which report to emit and
/// which value to return in place of the failed call.
pub struct Handler<E, T> {
    category: Cow<'static, str>,
    prefix: String,
    message: Source<E>,
    detail: Option<Source<E>>,
    substitute: Arc<dyn Fn(&E) -> T + Send + Sync>,
}

impl<E: 'static, T: Default + 'static> Handler<E, T> {
    /// A handler emitting `category` with an empty message and returning
    /// `T::default()`.
    pub fn new(category: impl Into<Cow<'static, str>>) -> Self {
        Self::with_substitute(category, |_| T::default())
    }
}

impl<E, T> Handler<E, T> {
    pub fn with_substitute(
        category: impl Into<Cow<'static, str>>,
        substitute: impl Fn(&E) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            category: category.into(),
            prefix: String::new(),
            message: Source::Empty,
            detail: None,
            substitute: Arc::new(substitute),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<Source<E>>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<Source<E>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Text placed in front of the resolved message.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn returning(mut self, value: T) -> Self
    where
        E: 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.substitute = Arc::new(move |_| value.clone());
        self
    }

    #[must_use]
    pub fn returning_with(mut self, substitute: impl Fn(&E) -> T + Send + Sync + 'static) -> Self {
        self.substitute = Arc::new(substitute);
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl<E: Classified, T> Handler<E, T> {
    pub fn report(&self, err: &E) -> ErrorReport {
        let mut message = self.prefix.clone();
        message.push_str(&self.message.resolve(err));
        ErrorReport {
            category: self.category.to_string(),
            message,
            detail: self.detail.as_ref().map(|d| d.resolve(err)),
        }
    }

    fn handle(&self, notifier: &Notifier, err: &E) -> T {
        let report = self.report(err);
        tracing::debug!(category = %report.category, error = %err, "guard caught error");
        notifier.report(&report);
        (self.substitute)(err)
    }
}

impl<E: 'static, T: Default + 'static> From<&'static str> for Handler<E, T> {
    fn from(category: &'static str) -> Self {
        Handler::new(category)
    }
}

impl<E, T> Clone for Handler<E, T> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            prefix: self.prefix.clone(),
            message: self.message.clone(),
            detail: self.detail.clone(),
            substitute: self.substitute.clone(),
        }
    }
}

impl<E, T> fmt::Debug for Handler<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("category", &self.category)
            .field("prefix", &self.prefix)
            .field("message", &self.message)
            .field("detail", &self.detail)
            .finish_non_exhaustive()
    }
}

type Matcher<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

struct Arm<E, T> {
    matches: Matcher<E>,
    handler: Handler<E, T>,
}

/// Converts declared failures into notifications plus a substitute value.
///
/// Arms are evaluated in declaration order; the first one matching the error
/// handles it. An error matching no arm is handed back unchanged and nothing
/// is emitted.
pub struct Guard<E, T> {
    notifier: Notifier,
    arms: Vec<Arm<E, T>>,
}

impl<E: Classified + 'static, T> Guard<E, T> {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            arms: Vec::new(),
        }
    }

    /// Handles errors for which `is_kind(kind)` holds.
    #[must_use]
    pub fn on(self, kind: E::Kind, handler: impl Into<Handler<E, T>>) -> Self {
        self.when(move |err: &E| err.is_kind(kind), handler)
    }

    /// Handles errors accepted by an arbitrary predicate.
    #[must_use]
    pub fn when(
        mut self,
        matches: impl Fn(&E) -> bool + Send + Sync + 'static,
        handler: impl Into<Handler<E, T>>,
    ) -> Self {
        self.arms.push(Arm {
            matches: Box::new(matches),
            handler: handler.into(),
        });
        self
    }

    /// Adds a final arm matching every error, making the guard total.
    pub fn otherwise(self, handler: impl Into<Handler<E, T>>) -> TotalGuard<E, T> {
        TotalGuard {
            guard: self,
            fallback: handler.into(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Resolves an error that has already occurred.
    pub fn handle(&self, err: E) -> Result<T, E> {
        match self.arms.iter().find(|arm| (arm.matches)(&err)) {
            Some(arm) => Ok(arm.handler.handle(&self.notifier, &err)),
            None => Err(err),
        }
    }

    pub fn run(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        op().or_else(|err| self.handle(err))
    }

    pub async fn run_async(&self, op: impl Future<Output = Result<T, E>>) -> Result<T, E> {
        match op.await {
            Ok(value) => Ok(value),
            Err(err) => self.handle(err),
        }
    }

    /// Wraps a fallible function into one guarded by `self`.
    pub fn wrap<A, F>(self, f: F) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
    {
        move |arg| self.run(|| f(arg))
    }
}

impl<E, T> fmt::Debug for Guard<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let categories: Vec<_> = self.arms.iter().map(|a| a.handler.category()).collect();
        f.debug_struct("Guard").field("arms", &categories).finish()
    }
}

/// A [`Guard`] whose last arm matches everything, so every call yields a `T`.
pub struct TotalGuard<E, T> {
    guard: Guard<E, T>,
    fallback: Handler<E, T>,
}

impl<E: Classified + 'static, T> TotalGuard<E, T> {
    pub fn handle(&self, err: E) -> T {
        match self.guard.handle(err) {
            Ok(value) => value,
            Err(err) => self.fallback.handle(&self.guard.notifier, &err),
        }
    }

    pub fn run(&self, op: impl FnOnce() -> Result<T, E>) -> T {
        match op() {
            Ok(value) => value,
            Err(err) => self.handle(err),
        }
    }

    pub async fn run_async(&self, op: impl Future<Output = Result<T, E>>) -> T {
        match op.await {
            Ok(value) => value,
            Err(err) => self.handle(err),
        }
    }

    pub fn wrap<A, F>(self, f: F) -> impl Fn(A) -> T
    where
        F: Fn(A) -> Result<T, E>,
    {
        move |arg| self.run(|| f(arg))
    }
}

impl<E, T> fmt::Debug for TotalGuard<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotalGuard")
            .field("guard", &self.guard)
            .field("fallback", &self.fallback.category())
            .finish()
    }
}
