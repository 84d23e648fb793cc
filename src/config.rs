use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub listen_addr: String,
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine in deployed environments where the
        // variables come from the process environment.
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "debug".into());
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        Ok(Self {
            database_url,
            rust_log,
            listen_addr,
            public_base_url,
        })
    }
}
