use redis::Client;

/// Creates a Redis client for trending counts
///
/// Opening the client only validates the URL; connections are established lazily
/// by the trending store's connection manager.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)
        .map_err(|e| anyhow::anyhow!("Invalid REDIS_URL {}: {}", redis_url, e))?;
    Ok(client)
}
