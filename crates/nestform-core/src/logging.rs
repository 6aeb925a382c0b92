//! `tracing` setup and the span every form validation runs in.

use crate::settings::Settings;

/// Installs a global `tracing` subscriber for applications that do not
/// bring their own.
///
/// `RUST_LOG` takes precedence over `settings.log_level`; an unparsable level
/// falls back to `info`. Debug settings log in a pretty multi-line layout,
/// otherwise one JSON object per event. Only the first call installs
/// anything.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if settings.debug {
        builder.pretty().with_file(true).with_line_number(true).try_init()
    } else {
        builder.json().with_current_span(true).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Creates a tracing span for the processing of one form.
///
/// # Examples
///
/// ```
/// use nestform_core::logging::form_span;
///
/// let span = form_span("user");
/// let _guard = span.enter();
/// tracing::info!("validating");
/// ```
pub fn form_span(namespace: &str) -> tracing::Span {
    tracing::debug_span!("form", namespace = namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_is_idempotent() {
        let settings = Settings {
            log_level: "not a level ((".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&Settings::default());
    }

    #[test]
    fn test_form_span() {
        let span = form_span("user");
        let _guard = span.enter();
        tracing::debug!("inside form span");
    }
}
