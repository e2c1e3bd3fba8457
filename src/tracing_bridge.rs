//! Bridge from `tracing` spans to Micromegas thread-local spans.
//!
//! Two kinds of spans are forwarded as Micromegas named scopes: Bevy's
//! "schedule" spans (labelled by their `name` field) and the harness's own
//! spans, whose target starts with this crate's name (labelled by span name,
//! so every turn shares one scope name). Everything else is ignored.

use std::fmt;

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

/// Label stored in a bridged span's extensions.
struct BridgedScope {
    name: &'static str,
}

/// Extracts the `name` field Bevy puts on schedule spans.
#[derive(Default)]
struct NameVisitor {
    name: Option<String>,
}

impl Visit for NameVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "name" {
            self.name = Some(format!("{value:?}"));
        }
    }
}

/// A `tracing_subscriber::Layer` forwarding selected spans to Micromegas.
pub struct MicromegasBridgeLayer {
    target_prefix: &'static str,
}

impl Default for MicromegasBridgeLayer {
    fn default() -> Self {
        Self {
            target_prefix: env!("CARGO_CRATE_NAME"),
        }
    }
}

impl MicromegasBridgeLayer {
    /// Forward spans whose target starts with `target_prefix` in addition to
    /// Bevy schedules.
    pub fn with_target_prefix(target_prefix: &'static str) -> Self {
        Self { target_prefix }
    }

    fn label(&self, attrs: &Attributes<'_>) -> Option<String> {
        let meta = attrs.metadata();
        if meta.name() != "schedule" {
            return meta
                .target()
                .starts_with(self.target_prefix)
                .then(|| meta.name().to_string());
        }
        let mut visitor = NameVisitor::default();
        attrs.record(&mut visitor);
        Some(visitor.name.unwrap_or_default())
    }
}

impl<S> Layer<S> for MicromegasBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(label) = self.label(attrs) else {
            return;
        };
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedScope {
                name: intern_string(&label),
            });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(scope) = extensions.get::<BridgedScope>() {
                on_begin_named_scope(&BRIDGE_LOCATION, scope.name);
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let extensions = span.extensions();
            if let Some(scope) = extensions.get::<BridgedScope>() {
                on_end_named_scope(&BRIDGE_LOCATION, scope.name);
            }
        }
    }
}
