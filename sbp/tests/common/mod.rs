#![allow(dead_code)]

use sbp::{BoxError, DomainState, Sbp, SelectorMap, typed};
use std::{
    io,
    sync::{Arc, Mutex},
};
use tracing_subscriber::fmt::MakeWriter;

// ============================================================================
// Test Registries
// ============================================================================

/// A registry with a `math` domain holding a running total.
pub fn math_registry() -> Sbp {
    let sbp = Sbp::new();
    sbp.register(math_selectors()).unwrap();
    sbp
}

pub fn math_selectors() -> SelectorMap {
    SelectorMap::new()
        .with(
            "math/_init",
            typed(|state: &DomainState, ()| {
                state.insert(Mutex::new(0i64));
                Ok::<_, BoxError>(())
            }),
        )
        .with(
            "math/add",
            typed(|_: &DomainState, (a, b): (i64, i64)| Ok::<_, BoxError>(a + b)),
        )
        .with(
            "math/accumulate",
            typed(|state: &DomainState, (n,): (i64,)| {
                let total = state.get::<Mutex<i64>>().ok_or("math not initialized")?;
                let mut total = total.lock().map_err(|e| e.to_string())?;
                *total += n;
                Ok::<_, BoxError>(*total)
            }),
        )
}

// ============================================================================
// Log Capture
// ============================================================================

/// Shared in-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a subscriber writing every event into a buffer and return
/// what was logged.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}
