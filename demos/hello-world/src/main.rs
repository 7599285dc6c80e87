//! Hello World example for Cirrus.
//!
//! This example demonstrates basic usage of Cirrus:
//! - Declaring a contract with `#[contract]`
//! - Implementing and serving it
//! - Calling it with the typed suspending and blocking clients
//!
//! Run with `RUST_LOG=debug` to see route binding and each remote call.

use std::sync::atomic::{AtomicU64, Ordering};

use cirrus::{CirrusError, CirrusServer, ClientConfig, ServerConfig, contract, make_server_router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Error)]
pub enum GreetError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name too long: {0} characters (max 100)")]
    NameTooLong(usize),
}

impl From<GreetError> for CirrusError {
    fn from(err: GreetError) -> Self {
        CirrusError::handler(422, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub number: u64,
}

#[contract]
pub trait Greeter {
    /// Greet someone by name.
    #[get("/greet/{name}")]
    async fn greet(
        &self,
        name: String,
        #[default("Hello")] salutation: String,
    ) -> Result<Greeting, GreetError>;

    /// Get the greeting count.
    #[get("/count")]
    async fn get_count(&self) -> Result<u64, GreetError>;

    /// Reset the greeting count.
    #[post("/reset")]
    async fn reset(&self) -> Result<u64, GreetError>;
}

struct GreeterImpl {
    count: AtomicU64,
}

impl GreeterImpl {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }
}

impl Greeter for GreeterImpl {
    async fn greet(&self, name: String, salutation: String) -> Result<Greeting, GreetError> {
        if name.is_empty() {
            return Err(GreetError::EmptyName);
        }
        if name.len() > 100 {
            return Err(GreetError::NameTooLong(name.len()));
        }

        let number = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Greeting {
            message: format!("{salutation}, {name}!"),
            number,
        })
    }

    async fn get_count(&self) -> Result<u64, GreetError> {
        Ok(self.count.load(Ordering::Relaxed))
    }

    async fn reset(&self) -> Result<u64, GreetError> {
        Ok(self.count.swap(0, Ordering::Relaxed))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Cirrus Hello World Example");
    println!("==========================\n");

    let definition = GreeterContract::definition()?;
    println!("Contract `{}`:", definition.name());
    for route in definition.routes() {
        println!("  {} {} -> {}", route.method(), route.path(), route.name());
    }

    let bound = make_server_router(&GreeterContract::server(GreeterImpl::new())?)?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = CirrusServer::new(bound).with_config(ServerConfig::new(addr.to_string()));
    let api_prefix = server.config().api_prefix.clone();
    tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            tracing::error!(error = %e, "server stopped");
        }
    });

    let config = ClientConfig::new(format!("http://{addr}{api_prefix}"));

    println!("\nSuspending client:");
    let client = GreeterContract::client(config.clone())?;
    let greeting = client.greet("World".to_string(), "Hello".to_string()).await?;
    println!("  greet(\"World\") = {} (#{})", greeting.message, greeting.number);

    let greeting = client.greet("Cirrus".to_string(), "Hi".to_string()).await?;
    println!("  greet(\"Cirrus\", \"Hi\") = {} (#{})", greeting.message, greeting.number);

    println!("  get_count() = {}", client.get_count().await?);

    println!("\nTesting error handling:");
    match client.greet(String::new(), "Hello".to_string()).await {
        Ok(_) => println!("  Unexpected success"),
        Err(e) => println!("  greet(\"\") = Error: {e}"),
    }

    println!("\nBlocking client:");
    let count = tokio::task::spawn_blocking(move || -> Result<u64, CirrusError> {
        let client = GreeterContract::blocking_client(config)?;
        let greeting = client.greet("thread".to_string(), "Hey".to_string())?;
        println!("  greet(\"thread\", \"Hey\") = {}", greeting.message);
        client.reset()
    })
    .await??;
    println!("  reset() = {count}");

    println!("\nExample completed successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_greeter_service() {
        let service = GreeterImpl::new();

        let greeting = service
            .greet("Test".to_string(), "Hello".to_string())
            .await
            .unwrap();
        assert_eq!(greeting.message, "Hello, Test!");
        assert_eq!(greeting.number, 1);

        assert_eq!(service.get_count().await.unwrap(), 1);
        assert_eq!(service.reset().await.unwrap(), 1);
        assert_eq!(service.get_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_greeter_errors() {
        let service = GreeterImpl::new();

        let result = service.greet(String::new(), "Hello".to_string()).await;
        assert!(matches!(result, Err(GreetError::EmptyName)));

        let long_name = "x".repeat(200);
        let result = service.greet(long_name, "Hello".to_string()).await;
        assert!(matches!(result, Err(GreetError::NameTooLong(_))));
    }

    #[test]
    fn test_error_status() {
        let err = CirrusError::from(GreetError::EmptyName);
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_contract_routes() {
        let definition = GreeterContract::definition().unwrap();
        let names: Vec<&str> = definition.routes().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["greet", "get_count", "reset"]);
    }
}
