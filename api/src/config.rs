use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 7205)]
    pub port: u16,

    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    /// Postgres connection string. Without one, data is kept in memory.
    #[clap(long = "db", env)]
    pub database_url: Option<String>,

    /// Where project files are stored: `local`, `memory`, or `s3`
    #[clap(long, env, default_value_t = String::from("local"))]
    pub storage_provider: String,

    /// The root directory for `local` storage, or `bucket/prefix` for `s3`
    #[clap(long, env, default_value = "./data/files")]
    pub storage_location: Option<String>,

    #[clap(long, env)]
    pub s3_endpoint: Option<String>,
    #[clap(long, env)]
    pub s3_region: Option<String>,
    #[clap(long, env)]
    pub s3_access_key_id: Option<String>,
    #[clap(long, env)]
    pub s3_secret_key: Option<String>,
    #[clap(long, env)]
    pub s3_virtual_host_style: Option<bool>,

    /// The base URL at which stored files are served
    #[clap(long, env, default_value_t = String::from("/files"))]
    pub public_url_base: String,

    /// How long to wait for each store or file storage call, in milliseconds. 0 waits forever.
    #[clap(long, env, default_value_t = 10_000)]
    pub store_timeout_ms: u64,

    #[clap(long, env, default_value_t = 30)]
    pub session_days: i64,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("project-board"))]
    pub honeycomb_dataset: String,
}
