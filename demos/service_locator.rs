//! Wires a small application through a `Container` at startup.
//!
//! Shows services keyed by their own type, several notifiers keyed by
//! surrogate marker types, and the recoverable lookups.
//!
//! Run with: RUST_LOG=sovran_registry=trace cargo run --example service_locator

use sovran_registry::{Container, ContainerError};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ContainerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let services = Container::new();

    // Plain services, keyed by their own type
    services.add(DatabaseConfig {
        host: "localhost".to_string(),
        port: 5432,
        database: "myapp".to_string(),
    });
    services.add(AppConfig {
        name: "MyApp".to_string(),
        debug: true,
    });
    services.add(Arc::new(Logger::new("app")));

    // One capability, two implementations, each under its own marker
    services.add_as::<Arc<dyn Notifier>, Email>(Arc::new(Email));
    services.add_as::<Arc<dyn Notifier>, Sms>(Arc::new(Sms));

    let user_service = UserService::new(services.clone());
    let order_service = OrderService::new(services.clone());

    user_service.create_user("alice")?;
    user_service.create_user("bob")?;
    order_service.create_order("alice", "Widget")?;

    // Re-registering replaces the previous value
    let mut config = services.get::<AppConfig>();
    config.debug = false;
    services.add(config);
    println!("Debug mode disabled");

    user_service.create_user("carol")?;

    // Optional services are looked up without panicking
    match services.try_get::<MetricsEndpoint>() {
        Some(endpoint) => println!("Metrics at {}", endpoint.0),
        None => println!("No metrics endpoint registered"),
    }

    println!("\nFinal configuration ({} services):", services.len());
    services.with(|cfg: &AppConfig| {
        println!("  App: {}", cfg.name);
        println!("  Debug: {}", cfg.debug);
    })?;
    services.with(|db: &DatabaseConfig| {
        println!("  Database: {}:{}/{}", db.host, db.port, db.database);
    })?;

    Ok(())
}

// ============================================================================
// Configuration and shared services
// ============================================================================

#[derive(Clone, Debug)]
struct DatabaseConfig {
    host: String,
    port: u16,
    database: String,
}

#[derive(Clone, Debug)]
struct AppConfig {
    name: String,
    debug: bool,
}

#[derive(Clone, Debug)]
struct MetricsEndpoint(String);

struct Logger {
    prefix: String,
}

impl Logger {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn log(&self, message: &str) {
        println!("[{}] {}", self.prefix, message);
    }
}

trait Notifier: Send + Sync {
    fn notify(&self, who: &str, message: &str);
}

struct Email;
struct Sms;

impl Notifier for Email {
    fn notify(&self, who: &str, message: &str) {
        println!("  -> email to {}: {}", who, message);
    }
}

impl Notifier for Sms {
    fn notify(&self, who: &str, message: &str) {
        println!("  -> sms to {}: {}", who, message);
    }
}

// ============================================================================
// Components that pull their dependencies from the container
// ============================================================================

struct UserService {
    services: Container,
}

impl UserService {
    fn new(services: Container) -> Self {
        Self { services }
    }

    fn create_user(&self, username: &str) -> Result<(), ContainerError> {
        // `Arc<Logger>` is keyed as `Logger`
        let logger = self.services.resolve::<Arc<Logger>>()?;
        logger.log(&format!("Creating user: {}", username));

        self.services.with(|db: &DatabaseConfig| {
            println!(
                "  -> Would insert into {}.users on {}:{}",
                db.database, db.host, db.port
            );
        })?;

        let welcome = self.services.get_as::<Arc<dyn Notifier>, Email>();
        welcome.notify(username, "welcome aboard");

        if self.services.get::<AppConfig>().debug {
            println!("  -> [DEBUG] User {} created successfully", username);
        }

        Ok(())
    }
}

struct OrderService {
    services: Container,
}

impl OrderService {
    fn new(services: Container) -> Self {
        Self { services }
    }

    fn create_order(&self, user: &str, item: &str) -> Result<(), ContainerError> {
        let logger = self.services.resolve::<Arc<Logger>>()?;
        logger.log(&format!("Creating order: {} for {}", item, user));

        self.services.with(|db: &DatabaseConfig| {
            println!(
                "  -> Would insert into {}.orders on {}:{}",
                db.database, db.host, db.port
            );
        })?;

        if let Some(sms) = self.services.try_get_as::<Arc<dyn Notifier>, Sms>() {
            sms.notify(user, &format!("order for {} placed", item));
        }

        Ok(())
    }
}
