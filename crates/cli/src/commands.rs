use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every step of a job
    Run {
        #[arg(long, help = "Job file path (JSON)")]
        config: String,

        #[arg(long, help = "Load extra variables for ${NAME} placeholders from this file")]
        env_file: Option<String>,

        #[arg(long, help = "Records per write transaction")]
        chunk_size: Option<usize>,

        #[arg(long, help = "Key ranges per table step")]
        partitions: Option<usize>,

        #[arg(long, help = "Partitions processed concurrently")]
        workers: Option<usize>,

        #[arg(
            long,
            help = "If specified, writes the JSON job result to this file"
        )]
        report: Option<String>,
    },
    /// Resolve and validate a job file, then print it as JSON
    Validate {
        #[arg(long, help = "Job file path (JSON)")]
        config: String,

        #[arg(long)]
        env_file: Option<String>,
    },
    /// Print the key ranges a step would be split into
    Plan {
        #[arg(long, help = "Job file path (JSON)")]
        config: String,

        #[arg(long, help = "Step name")]
        step: String,

        #[arg(long)]
        env_file: Option<String>,

        #[arg(long)]
        partitions: Option<usize>,
    },
    /// Test a Postgres connection string
    TestConn {
        /// Connection string or URL
        #[arg(long)]
        url: String,
    },
}
