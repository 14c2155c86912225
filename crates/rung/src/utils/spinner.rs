use spinoff::{Color, spinners};

/// Terminal spinner shown while long running work is in progress
pub(crate) struct Spinner {
    inner: spinoff::Spinner,
}

impl Spinner {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self {
            inner: spinoff::Spinner::new(spinners::Dots, text.into(), Color::Cyan),
        }
    }

    pub(crate) fn update_text(&mut self, text: impl Into<String>) {
        self.inner.update_text(text.into());
    }

    pub(crate) fn stop_success(&mut self, msg: impl AsRef<str>) {
        self.inner.success(msg.as_ref());
    }

    pub(crate) fn stop_error(&mut self, msg: impl AsRef<str>) {
        self.inner.fail(msg.as_ref());
    }

    pub(crate) fn stop_and_persist(&mut self, symbol: &str, msg: impl AsRef<str>) {
        self.inner.stop_and_persist(symbol, msg.as_ref());
    }
}
