use indicatif::ProgressStyle;
use tracing::{info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// A span that renders as a progress bar while entered (or while a future
/// instrumented with it runs). Without the indicatif layer installed the bar
/// calls are no-ops.
pub fn progress_span(len: u64, message: &str) -> Span {
    let span = info_span!("progress");
    span.pb_set_style(&progress_style());
    span.pb_set_length(len);
    span.pb_set_message(message);

    span
}
