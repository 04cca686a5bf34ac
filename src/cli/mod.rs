use clap::Subcommand;
use uuid::Uuid;

use crate::domain::YearMonth;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, env = "SERVER_HOST", default_value = "localhost")]
        host: String,

        #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
        port: u16,
    },

    /// Record a new subscription
    Create {
        service_name: String,

        /// Price in minor currency units
        #[arg(short, long)]
        price: i64,

        #[arg(short, long)]
        user_id: Uuid,

        /// First billed month (MM-YYYY)
        #[arg(short, long)]
        start_date: YearMonth,

        /// Last billed month (MM-YYYY); omit for an active subscription
        #[arg(short, long)]
        end_date: Option<YearMonth>,
    },

    Get {
        id: Uuid,
    },

    /// Replace every field of an existing subscription
    Update {
        id: Uuid,

        #[arg(long)]
        service_name: String,

        #[arg(short, long)]
        price: i64,

        #[arg(short, long)]
        user_id: Uuid,

        #[arg(short, long)]
        start_date: YearMonth,

        #[arg(short, long)]
        end_date: Option<YearMonth>,
    },

    Delete {
        id: Uuid,
    },

    List {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        limit: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },

    /// Sum subscription prices, optionally filtered
    Cost {
        #[arg(short, long)]
        user_id: Option<Uuid>,

        /// Case-insensitive substring of the service name
        #[arg(long)]
        service_name: Option<String>,

        /// Only subscriptions starting in or after this month (MM-YYYY)
        #[arg(short, long)]
        start_date: Option<YearMonth>,

        /// Only subscriptions ending in or before this month, plus active ones (MM-YYYY)
        #[arg(short, long)]
        end_date: Option<YearMonth>,
    },
}
