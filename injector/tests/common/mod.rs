//! Helpers shared by the integration tests.

use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
  /// Runs `f` with every `fibre_injector` event written to this buffer.
  pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
    let subscriber = tracing_subscriber::fmt()
      .with_env_filter("fibre_injector=trace")
      .with_writer(self.clone())
      .with_ansi(false)
      .finish();
    tracing::subscriber::with_default(subscriber, f)
  }

  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
  }
}

impl io::Write for CapturedLogs {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
  type Writer = CapturedLogs;

  fn make_writer(&'a self) -> Self::Writer {
    self.clone()
  }
}
