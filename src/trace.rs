//! Conditional tracing macros (zero-cost when feature disabled).
//!
//! Spans and events go through these wrappers so that call sites read the
//! same whether or not the `tracing` feature is compiled in.

/// Create an info-level span around a pipeline stage.
///
/// Expands to `tracing::info_span!` with the feature on, and to a dummy
/// guard with it off.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emit a debug-level event for intermediate measurements.
///
/// With the feature off the field values are still evaluated, then
/// discarded, so expressions with side effects behave the same either way.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::debug!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

/// Emit an error-level event for failed or empty search outcomes.
#[cfg(feature = "tracing")]
macro_rules! trace_error {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::error!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::error!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_error {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

pub(crate) use trace_debug;
pub(crate) use trace_error;
pub(crate) use trace_span;

/// Stand-in span guard when tracing is disabled, so
/// `let _guard = trace_span!(...).entered();` needs no cfg at call sites.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns self, mimicking `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
