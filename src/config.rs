/// Server configuration, read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub session_ttl_days: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://saribooks.db".to_string()),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5),
            session_ttl_days: parsed("SESSION_TTL_DAYS", 30),
            bcrypt_cost: parsed("BCRYPT_COST", 12),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
