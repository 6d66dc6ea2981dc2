use crate::domain::model::StepLog;
use crate::domain::ports::{ConnectionSettings, SmokeSuite};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

/// How long the pub/sub step waits for its own message before giving up.
const PUBSUB_WAIT: Duration = Duration::from_secs(5);

/// Walks the key-value client surface: the five core data types, key
/// commands, counters, an atomic MULTI/EXEC pipeline, a Lua script, and
/// publish/subscribe with a background listener.
pub struct RedisSuite {
    url: String,
    channel: String,
}

impl RedisSuite {
    pub fn new(settings: &impl ConnectionSettings) -> Self {
        Self {
            url: settings.keyvalue_url().to_string(),
            channel: settings.keyvalue_channel().to_string(),
        }
    }

    async fn crud(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        // Create
        let _: () = con.set("name", "Alice").await?;
        let _: () = con.set_multiple(&[("age", "30"), ("city", "New York")]).await?;
        let _: () = con
            .hset_multiple("user:1000", &[("username", "bob"), ("email", "bob@example.com")])
            .await?;
        let _: () = con.lpush("tasks", &["task1", "task2"]).await?;
        let _: () = con.sadd("skills", &["JavaScript", "TypeScript"]).await?;
        let _: () = con
            .zadd_multiple("scores", &[(100, "player1"), (200, "player2")])
            .await?;
        log.record("create", "string, hash, list, set, sorted set written");

        // Read
        let name: Option<String> = con.get("name").await?;
        log.record("GET name", name.unwrap_or_else(|| "nil".to_string()));

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&["age", "city"])
            .query_async(con)
            .await?;
        log.record("MGET age city", format!("{:?}", values));

        let email: Option<String> = con.hget("user:1000", "email").await?;
        log.record("HGET user:1000 email", email.unwrap_or_else(|| "nil".to_string()));

        let tasks: Vec<String> = con.lrange("tasks", 0, -1).await?;
        log.record("LRANGE tasks", format!("{:?}", tasks));

        let skills: Vec<String> = con.smembers("skills").await?;
        log.record("SMEMBERS skills", format!("{} members", skills.len()));

        let scores: Vec<(String, f64)> = con.zrange_withscores("scores", 0, -1).await?;
        log.record("ZRANGE scores", format_scores(&scores));

        // Update
        let _: () = con.set("name", "Alice Smith").await?;
        let _: () = con.hset("user:1000", "email", "alice@example.com").await?;
        let _: () = con.lset("tasks", 0, "task1-updated").await?;
        let _: () = con.sadd("skills", "Rust").await?;
        let _: () = con.zadd("scores", "player1", 150).await?;
        log.record("update", "each structure rewritten");

        // Delete
        let _: () = con.del("name").await?;
        let _: () = con.hdel("user:1000", "email").await?;
        let _: Option<String> = con.lpop("tasks", None).await?;
        let _: () = con.srem("skills", "JavaScript").await?;
        let _: () = con.zrem("scores", "player1").await?;
        log.record("delete", "one entry removed per structure");

        Ok(())
    }

    async fn key_commands(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        let _: () = con.set("temp", "value").await?;

        let exists: bool = con.exists("temp").await?;
        let _: () = con.expire("temp", 10).await?;
        let ttl: i64 = con.ttl("temp").await?;
        let key_type: String = redis::cmd("TYPE").arg("temp").query_async(con).await?;
        let _: () = con.rename("temp", "temp_new").await?;
        let renamed: Option<String> = con.get("temp_new").await?;
        let _: () = con.del("temp_new").await?;

        log.record(
            "key_commands",
            format!(
                "exists={} ttl={} type={} renamed_value={}",
                exists,
                ttl,
                key_type,
                renamed.unwrap_or_else(|| "nil".to_string())
            ),
        );
        Ok(())
    }

    async fn data_structures(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        // Counter
        let _: () = con.set("counter", 1).await?;
        let _: i64 = con.incr("counter", 1).await?;
        let after_decr: i64 = con.decr("counter", 1).await?;
        log.record("counter", format!("INCR then DECR -> {}", after_decr));

        // Hash
        let _: () = con
            .hset_multiple("profile:1001", &[("name", "Charlie"), ("age", "25")])
            .await?;
        let profile: std::collections::HashMap<String, String> = con.hgetall("profile:1001").await?;
        let _: () = con.hdel("profile:1001", "age").await?;
        log.record("hash", format!("{} fields", profile.len()));

        // List
        let _: () = con.rpush("queue", &["item1", "item2"]).await?;
        let queue: Vec<String> = con.lrange("queue", 0, -1).await?;
        let _: Option<String> = con.lpop("queue", None).await?;
        log.record("list", format!("{:?}", queue));

        // Set
        let _: () = con.sadd("tags", &["redis", "database"]).await?;
        let is_member: bool = con.sismember("tags", "redis").await?;
        let _: () = con.srem("tags", "database").await?;
        log.record("set", format!("SISMEMBER tags redis = {}", is_member));

        // Sorted set
        let _: () = con
            .zadd_multiple("leaderboard", &[(100, "player1"), (200, "player2")])
            .await?;
        let leaderboard: Vec<(String, f64)> = con.zrange_withscores("leaderboard", 0, -1).await?;
        let rank: Option<u64> = con.zrank("leaderboard", "player1").await?;
        let _: () = con.zrem("leaderboard", "player2").await?;
        log.record(
            "sorted_set",
            format!("{}; player1 rank={:?}", format_scores(&leaderboard), rank),
        );

        Ok(())
    }

    async fn transaction(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        let (counter,): (i64,) = redis::pipe()
            .atomic()
            .set("foo", "bar")
            .ignore()
            .incr("counter", 1)
            .query_async(con)
            .await?;
        log.record("transaction", format!("MULTI/EXEC ok, counter={}", counter));
        Ok(())
    }

    async fn scripting(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        let script = redis::Script::new("return redis.call('SET', KEYS[1], ARGV[1])");
        let result: String = script
            .key("script:key")
            .arg("script-value")
            .invoke_async(con)
            .await?;
        log.record("script", format!("EVAL -> {}", result));
        Ok(())
    }

    async fn pubsub(&self, con: &mut MultiplexedConnection, log: &mut StepLog) -> Result<()> {
        // Subscriptions need their own connection
        let subscriber = redis::Client::open(self.url.as_str())?;
        let mut pubsub = subscriber.get_async_connection().await?.into_pubsub();
        pubsub.subscribe(&self.channel).await?;

        let listener = tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            match stream.next().await {
                Some(msg) => {
                    let channel = msg.get_channel_name().to_string();
                    msg.get_payload::<String>().ok().map(|payload| (channel, payload))
                }
                None => None,
            }
        });

        let receivers: i64 = con.publish(&self.channel, "Hello, world!").await?;
        tracing::debug!("Published to {} subscriber(s)", receivers);

        let received = tokio::time::timeout(PUBSUB_WAIT, listener)
            .await
            .map_err(|_| SmokeError::UnexpectedResponseError {
                store: "keyvalue".to_string(),
                message: format!(
                    "no message on '{}' within {}s",
                    self.channel,
                    PUBSUB_WAIT.as_secs()
                ),
            })?
            .map_err(|e| SmokeError::UnexpectedResponseError {
                store: "keyvalue".to_string(),
                message: format!("listener task failed: {}", e),
            })?;

        match received {
            Some((channel, payload)) => {
                log.record("pubsub", format!("received '{}' on {}", payload, channel))
            }
            None => {
                return Err(SmokeError::UnexpectedResponseError {
                    store: "keyvalue".to_string(),
                    message: "subscription stream closed without a message".to_string(),
                })
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SmokeSuite for RedisSuite {
    fn name(&self) -> &str {
        "keyvalue"
    }

    fn operations(&self) -> Vec<&'static str> {
        vec![
            "connect",
            "create",
            "GET name",
            "MGET age city",
            "HGET user:1000 email",
            "LRANGE tasks",
            "SMEMBERS skills",
            "ZRANGE scores",
            "update",
            "delete",
            "key_commands",
            "counter",
            "hash",
            "list",
            "set",
            "sorted_set",
            "transaction",
            "script",
            "pubsub",
        ]
    }

    async fn run(&self, log: &mut StepLog) -> Result<()> {
        tracing::debug!("Key-value suite targeting {}", self.url);

        let client = redis::Client::open(self.url.as_str())?;
        let mut con = client.get_multiplexed_async_connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut con).await?;
        log.record("connect", pong);

        self.crud(&mut con, log).await?;
        self.key_commands(&mut con, log).await?;
        self.data_structures(&mut con, log).await?;
        self.transaction(&mut con, log).await?;
        self.scripting(&mut con, log).await?;
        self.pubsub(&mut con, log).await?;

        Ok(())
    }
}

pub fn format_scores(scores: &[(String, f64)]) -> String {
    let formatted: Vec<String> = scores
        .iter()
        .map(|(member, score)| format!("{}={}", member, score))
        .collect();
    formatted.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_format_scores() {
        let scores = vec![("player1".to_string(), 100.0), ("player2".to_string(), 200.0)];
        assert_eq!(format_scores(&scores), "player1=100, player2=200");
        assert_eq!(format_scores(&[]), "");
    }

    #[test]
    fn test_menu_matches_walkthrough_order() {
        let suite = RedisSuite::new(&FileConfig::default());
        let operations = suite.operations();

        assert_eq!(operations.first(), Some(&"connect"));
        assert_eq!(operations.last(), Some(&"pubsub"));
        // One report line per menu entry; the transaction and script steps
        // come after every data-structure group.
        let tx = operations.iter().position(|o| *o == "transaction").unwrap();
        let sorted_set = operations.iter().position(|o| *o == "sorted_set").unwrap();
        assert!(sorted_set < tx);
    }

    #[test]
    fn test_suite_reads_settings() {
        let mut config = FileConfig::default();
        config.keyvalue.url = "redis://cache:6380".to_string();
        config.keyvalue.channel = "alerts".to_string();

        let suite = RedisSuite::new(&config);
        assert_eq!(suite.url, "redis://cache:6380");
        assert_eq!(suite.channel, "alerts");
    }
}
