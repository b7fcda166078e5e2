use fibre_injector::{
  globals, injector, Dependencies, Factory, Injectable, Key, Result,
};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

struct ConsoleLogger {
  prefix: String,
}

impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[{}] {}", self.prefix, message);
  }
}

// Trait objects are stored as `Arc<dyn Logger>` values.
type SharedLogger = Arc<dyn Logger>;

struct ReportService {
  logger: Arc<SharedLogger>,
}

impl Injectable for ReportService {
  fn inject() -> Vec<Key> {
    vec![Key::from("logger")]
  }

  fn construct(deps: &Dependencies) -> Result<Self> {
    Ok(ReportService {
      logger: deps.get(0)?,
    })
  }
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // The log prefix lives in the global namespace, outside any registration.
  globals().set("log_prefix", String::from("report"));

  let scope = injector().child_scope();
  scope
    .register(
      "logger",
      Some(vec!["log_prefix".into()]),
      Some(Factory::new(|deps| {
        let prefix = deps.get::<String>(0)?;
        Ok(Arc::new(ConsoleLogger {
          prefix: prefix.to_string(),
        }) as SharedLogger)
      })),
    )
    .expect("registration failed");

  // ReportService is never registered: it is built from its own declaration.
  println!("Resolving the high-level service...");
  let report_service = scope
    .resolve_type::<ReportService>()
    .expect("resolution failed")
    .expect("ReportService is constructible");

  println!("Using the service...");
  report_service.generate_report();
}
