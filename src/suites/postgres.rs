use crate::domain::model::{StepLog, User};
use crate::domain::ports::{ConnectionSettings, SmokeSuite};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use futures::{pin_mut, TryStreamExt};
use tokio_postgres::{NoTls, Row};

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL,
        age INT
    );
    CREATE TABLE IF NOT EXISTS orders (
        id SERIAL PRIMARY KEY,
        user_id INT REFERENCES users(id),
        product VARCHAR(100),
        amount INT
    );
";

// RESTART IDENTITY keeps reruns deterministic
const RESET_TABLES: &str = "TRUNCATE orders, users RESTART IDENTITY CASCADE";

const INSERT_USER: &str = "INSERT INTO users (name, email, age) VALUES ($1, $2, $3) RETURNING id";

const INSERT_ORDER: &str = "INSERT INTO orders (user_id, product, amount) VALUES ($1, $2, $3)";

const SELECT_USERS: &str = "SELECT id, name, email, age FROM users ORDER BY id";

const UPDATE_USER: &str =
    "UPDATE users SET name = $1, email = $2, age = $3 WHERE id = $4 RETURNING id";

const DELETE_USER: &str = "DELETE FROM users WHERE id = $1 RETURNING id";

const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

const FILTER_USERS: &str = "
    SELECT id, name, email, age FROM users
    WHERE age >= 18 AND age <= 30
      AND name IN ('Alice', 'Bob')
      AND (age < 25 OR name = 'Charlie')
      AND age > 20 AND name <> 'Dave'
";

// One assignment per column; the CASE keeps the arithmetic branch coverage
const UPDATE_OPERATORS: &str = "
    UPDATE users
    SET name = 'Updated Name',
        age = CASE WHEN age > 30 THEN age - 1 ELSE age + 1 END
    WHERE name = 'Alice Smith'
    RETURNING id
";

// Casts keep the decoded types simple (bigint / float8)
const AGGREGATE_ORDERS: &str = "
    SELECT user_id, SUM(amount)::bigint AS total_amount, AVG(amount)::float8 AS average_amount
    FROM orders
    GROUP BY user_id
    HAVING SUM(amount) > 100
    ORDER BY total_amount DESC
";

const JOIN_USERS_ORDERS: &str = "
    SELECT u.name, u.email, o.product, o.amount
    FROM users u
    JOIN orders o ON u.id = o.user_id
";

const CREATE_EMAIL_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)";
const DROP_EMAIL_INDEX: &str = "DROP INDEX IF EXISTS idx_users_email";

const EXPLAIN_USERS: &str = "EXPLAIN SELECT * FROM users";

const COPY_USERS_CSV: &str = "COPY users TO STDOUT WITH (FORMAT CSV)";

/// Walks the relational client surface: DDL, CRUD with RETURNING, operator
/// queries, aggregation, joins, indexing, a transaction, and the maintenance
/// statements (EXPLAIN / VACUUM / ANALYZE / COPY).
pub struct PostgresSuite {
    dsn: String,
    pool_size: usize,
}

impl PostgresSuite {
    pub fn new(settings: &impl ConnectionSettings) -> Self {
        Self {
            dsn: settings.relational_dsn().to_string(),
            pool_size: settings.relational_pool_size(),
        }
    }

    fn build_pool(&self) -> Result<Pool> {
        let pg_config: tokio_postgres::Config = self.dsn.parse()?;
        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        Pool::builder(manager)
            .max_size(self.pool_size)
            .build()
            .map_err(|e| SmokeError::ConfigValidationError {
                field: "relational.pool_size".to_string(),
                message: e.to_string(),
            })
    }
}

impl User {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            age: row.get("age"),
        }
    }
}

pub fn format_user(user: &User) -> String {
    format!(
        "id={} name={} email={} age={}",
        user.id,
        user.name,
        user.email,
        user.age.map(|a| a.to_string()).unwrap_or_else(|| "null".to_string())
    )
}

#[async_trait]
impl SmokeSuite for PostgresSuite {
    fn name(&self) -> &str {
        "relational"
    }

    fn operations(&self) -> Vec<&'static str> {
        vec![
            "connect",
            "create_tables",
            "reset",
            "insert_users",
            "select_users",
            "update_user",
            "delete_user",
            "seed_orders",
            "operator_query",
            "update_operators",
            "aggregate",
            "join",
            "indexing",
            "transaction",
            "explain",
            "vacuum",
            "analyze",
            "copy_out",
        ]
    }

    async fn run(&self, log: &mut StepLog) -> Result<()> {
        tracing::debug!("Relational suite targeting {}", self.dsn);

        let pool = self.build_pool()?;
        let mut client = pool.get().await?;

        let row = client.query_one("SHOW server_version", &[]).await?;
        log.record("connect", format!("server version {}", row.get::<_, String>(0)));

        client.batch_execute(CREATE_TABLES).await?;
        log.record("create_tables", "users, orders ready");

        client.batch_execute(RESET_TABLES).await?;
        log.record("reset", "tables truncated");

        let alice_id: i32 = client
            .query_one(INSERT_USER, &[&"Alice", &"alice@example.com", &25i32])
            .await?
            .get(0);
        let bob_id: i32 = client
            .query_one(INSERT_USER, &[&"Bob", &"bob@example.com", &30i32])
            .await?
            .get(0);
        log.record("insert_users", format!("ids {} and {}", alice_id, bob_id));

        let users: Vec<User> = client
            .query(SELECT_USERS, &[])
            .await?
            .iter()
            .map(User::from_row)
            .collect();
        let first = users.first().map(format_user).unwrap_or_else(|| "none".to_string());
        log.record("select_users", format!("{} rows, first: {}", users.len(), first));

        let updated: i32 = client
            .query_one(
                UPDATE_USER,
                &[&"Alice Smith", &"alice.smith@example.com", &26i32, &alice_id],
            )
            .await?
            .get(0);
        log.record("update_user", format!("updated id={}", updated));

        let deleted: i32 = client.query_one(DELETE_USER, &[&bob_id]).await?.get(0);
        let remaining: i64 = client.query_one(COUNT_USERS, &[]).await?.get(0);
        log.record("delete_user", format!("deleted id={}, remaining={}", deleted, remaining));

        for (product, amount) in [("Widget", 50i32), ("Gadget", 75i32), ("Sprocket", 25i32)] {
            client.execute(INSERT_ORDER, &[&alice_id, &product, &amount]).await?;
        }
        log.record("seed_orders", "3 orders for the first user");

        let filtered = client.query(FILTER_USERS, &[]).await?;
        log.record("operator_query", format!("{} matches", filtered.len()));

        let touched = client.query(UPDATE_OPERATORS, &[]).await?;
        log.record("update_operators", format!("{} rows updated", touched.len()));

        let aggregates = client.query(AGGREGATE_ORDERS, &[]).await?;
        let summary = aggregates
            .first()
            .map(|row| {
                format!(
                    "user_id={} total={} avg={:.2}",
                    row.get::<_, i32>("user_id"),
                    row.get::<_, i64>("total_amount"),
                    row.get::<_, f64>("average_amount")
                )
            })
            .unwrap_or_else(|| "no rows".to_string());
        log.record("aggregate", format!("{} groups, {}", aggregates.len(), summary));

        let joined = client.query(JOIN_USERS_ORDERS, &[]).await?;
        log.record("join", format!("{} user/order rows", joined.len()));

        client.batch_execute(CREATE_EMAIL_INDEX).await?;
        client.batch_execute(DROP_EMAIL_INDEX).await?;
        log.record("indexing", "email index created and dropped");

        let tx = client.transaction().await?;
        tx.execute(INSERT_USER, &[&"Charlie", &"charlie@example.com", &22i32])
            .await?;
        tx.execute(INSERT_USER, &[&"Dana", &"dana@example.com", &28i32])
            .await?;
        tx.commit().await?;
        log.record("transaction", "2 inserts committed");

        let plan = client.query(EXPLAIN_USERS, &[]).await?;
        let first_line = plan
            .first()
            .map(|row| row.get::<_, String>(0))
            .unwrap_or_default();
        log.record("explain", format!("{} plan lines, root: {}", plan.len(), first_line));

        client.batch_execute("VACUUM").await?;
        log.record("vacuum", "ok");

        client.batch_execute("ANALYZE").await?;
        log.record("analyze", "ok");

        let stream = client.copy_out(COPY_USERS_CSV).await?;
        pin_mut!(stream);
        let mut bytes = 0usize;
        while let Some(chunk) = stream.try_next().await? {
            bytes += chunk.len();
        }
        log.record("copy_out", format!("{} CSV bytes", bytes));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder_count(sql: &str) -> usize {
        (1..)
            .take_while(|n| sql.contains(&format!("${}", n)))
            .count()
    }

    #[test]
    fn test_statement_placeholders() {
        assert_eq!(placeholder_count(INSERT_USER), 3);
        assert_eq!(placeholder_count(INSERT_ORDER), 3);
        assert_eq!(placeholder_count(UPDATE_USER), 4);
        assert_eq!(placeholder_count(DELETE_USER), 1);
        assert_eq!(placeholder_count(FILTER_USERS), 0);
    }

    #[test]
    fn test_write_statements_return_ids() {
        for sql in [INSERT_USER, UPDATE_USER, DELETE_USER, UPDATE_OPERATORS] {
            assert!(sql.contains("RETURNING id"), "missing RETURNING in: {}", sql);
        }
    }

    #[test]
    fn test_update_operators_assigns_each_column_once() {
        // Double assignment of one column is rejected by the server
        assert_eq!(UPDATE_OPERATORS.matches("age =").count(), 1);
        assert_eq!(UPDATE_OPERATORS.matches("name =").count(), 1);
    }

    #[test]
    fn test_aggregate_casts_keep_types_decodable() {
        assert!(AGGREGATE_ORDERS.contains("SUM(amount)::bigint"));
        assert!(AGGREGATE_ORDERS.contains("AVG(amount)::float8"));
        assert!(AGGREGATE_ORDERS.contains("HAVING SUM(amount) > 100"));
    }

    #[test]
    fn test_format_user_handles_null_age() {
        let user = User {
            id: 7,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            age: None,
        };
        assert_eq!(format_user(&user), "id=7 name=Dana email=dana@example.com age=null");
    }
}
