//! MongoDB connection management with pool configuration and health checking

use bson::{doc, Document as BsonDocument};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use opo_common::{OpoError, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool (default: 0)
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool (default: 1)
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed (default: none)
    pub max_idle_time: Option<Duration>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            // Every call is awaited before the next one starts, so one socket is enough
            min_pool_size: Some(0),
            max_pool_size: Some(1),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("opo-backfill".to_string()),
        }
    }
}

impl PoolConfig {
    fn apply(self, client_options: &mut ClientOptions) {
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = self.app_name {
            client_options.app_name = Some(app);
        }
    }
}

/// MongoDB connection bound to one database
pub struct Connection {
    client: Client,
    database: Database,
    database_name: String,
}

impl Connection {
    /// Open a connection to `database_name` and verify the server answers.
    ///
    /// The database is selected by name, not taken from the URI path.
    pub async fn connect(
        connection_string: &str,
        database_name: &str,
        config: PoolConfig,
    ) -> Result<Self> {
        let mut client_options = ClientOptions::parse(connection_string).await?;
        config.apply(&mut client_options);

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;
        let database = client.database(database_name);

        let connection = Self {
            client,
            database,
            database_name: database_name.to_string(),
        };

        // The driver connects lazily; ping so an unreachable server fails here
        if let Err(e) = connection.ping().await {
            connection.shutdown().await;
            return Err(e);
        }
        info!(database = %connection.database_name, "Connected to MongoDB");

        Ok(connection)
    }

    /// Get a collection by name (returns untyped BsonDocument collection)
    pub fn get_collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }

    /// Get a typed collection
    pub fn get_typed_collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// Check the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| OpoError::Connection(format!("Ping failed: {}", e)))
    }

    /// Close the client, waiting for the driver to release its sockets
    pub async fn shutdown(self) {
        debug!(database = %self.database_name, "Shutting down MongoDB client");
        self.client.shutdown().await;
    }
}
