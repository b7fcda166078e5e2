use fibre_injector::{injector, Factory, Injector};
use std::sync::Arc;

struct Session {
  user: String,
}

// Handles one request in its own scope, so it gets its own Session.
fn handle_request(app: &Arc<Injector>, user: &str) -> Arc<Session> {
  let scope = app.child_scope();
  scope
    .register_instance("user", user.to_string())
    .expect("user already registered in this scope");
  scope
    .resolve::<Session>("session")
    .expect("session could not be built")
    .expect("session is registered on the application scope")
}

fn main() {
  // The application scope knows how to build a session from the current user.
  let app = injector().child_scope();
  app
    .register(
      "session",
      Some(vec!["user".into()]),
      Some(Factory::new(|deps| {
        Ok(Session {
          user: deps.get::<String>(0)?.to_string(),
        })
      })),
    )
    .expect("registration failed");

  let alice = handle_request(&app, "alice");
  let bob = handle_request(&app, "bob");

  println!("first request served {}", alice.user);
  println!("second request served {}", bob.user);
  assert_eq!(alice.user, "alice");
  assert_eq!(bob.user, "bob");
  assert!(!Arc::ptr_eq(&alice, &bob));

  // Nothing leaked into the application scope.
  assert!(app.resolve_value("user").unwrap().is_none());
}
