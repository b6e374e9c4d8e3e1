use std::sync::{Arc, Mutex};

use super::*;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = build_subscriber(EnvFilter::new("info"), move || writer.clone());
    tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn lines_are_prefixed_plain_text() {
    let out = capture(|| tracing::warn!(document = 2, "yaml aliases are not supported"));
    assert!(!out.contains('\u{1b}'), "{:?}", out);
    assert_eq!(out, "showksec: yaml aliases are not supported document=2\n");
}

#[test]
fn filter_drops_lower_levels() {
    let out = capture(|| {
        tracing::debug!("hidden");
        tracing::info!("shown");
    });
    assert_eq!(out, "showksec: shown\n");
}
