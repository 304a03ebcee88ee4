use clap::{Parser, Subcommand};
use medlab_db_mysql::DbConfig;

#[derive(Parser)]
#[command(name = "medlab")]
#[command(about = "MedLAB+ CLI — manage the laboratory database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Full connection URL (overrides the discrete connection flags)
    #[arg(long, global = true, env = "MEDLAB_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database host
    #[arg(long, global = true, default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, global = true, default_value_t = 3306)]
    pub port: u16,

    /// Database user
    #[arg(long, global = true, default_value = "root")]
    pub user: String,

    /// Database password
    #[arg(long, global = true, env = "MEDLAB_DATABASE_PASSWORD")]
    pub password: Option<String>,

    /// Database name
    #[arg(long, global = true, default_value = "medlab_db")]
    pub database: String,
}

impl Cli {
    /// Storage configuration assembled from the connection flags.
    pub fn db_config(&self) -> DbConfig {
        match &self.database_url {
            Some(url) => DbConfig::new(url),
            None => DbConfig {
                host: self.host.clone(),
                port: self.port,
                user: self.user.clone(),
                password: self.password.clone(),
                database: self.database.clone(),
                ..DbConfig::default()
            },
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and all tables (idempotent)
    Schema,
    /// Fill the database with generated mock data
    Seed(SeedArgs),
}

#[derive(clap::Args)]
pub struct SeedArgs {
    /// Number of patients to generate
    #[arg(long, default_value_t = 50)]
    pub patients: u32,

    /// Number of test orders to generate
    #[arg(long, default_value_t = 100)]
    pub orders: u32,

    /// Keep existing rows instead of clearing the tables first
    #[arg(long)]
    pub keep_existing: bool,
}
