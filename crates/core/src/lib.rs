pub mod detect;
pub mod engine;
pub mod fetch;
pub mod notify;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_TIMEZONE: &str = "America/New_York";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub page_url: Option<String>,
        pub email_api_key: Option<String>,
        pub primary_recipient: Option<String>,
        pub secondary_recipient: Option<String>,
        pub sender_address: Option<String>,
        pub sentry_dsn: Option<String>,
        pub state_path: Option<String>,
        pub timezone: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                page_url: std::env::var("PAGE_URL").ok(),
                email_api_key: std::env::var("EMAIL_API_KEY").ok(),
                primary_recipient: std::env::var("PRIMARY_RECIPIENT").ok(),
                secondary_recipient: std::env::var("SECONDARY_RECIPIENT").ok(),
                sender_address: std::env::var("SENDER_ADDRESS").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                state_path: std::env::var("WATCH_STATE_PATH").ok(),
                timezone: std::env::var("WATCH_TIMEZONE").ok(),
            })
        }

        pub fn require_page_url(&self) -> anyhow::Result<&str> {
            self.page_url.as_deref().context("PAGE_URL is required")
        }

        pub fn require_email_api_key(&self) -> anyhow::Result<&str> {
            self.email_api_key
                .as_deref()
                .context("EMAIL_API_KEY is required")
        }

        pub fn require_primary_recipient(&self) -> anyhow::Result<&str> {
            self.primary_recipient
                .as_deref()
                .context("PRIMARY_RECIPIENT is required")
        }

        pub fn require_sender_address(&self) -> anyhow::Result<&str> {
            self.sender_address
                .as_deref()
                .context("SENDER_ADDRESS is required")
        }

        /// Timezone the daily report window is anchored to. Defaults to
        /// US Eastern; a name the tz database does not know is a fatal
        /// configuration error.
        pub fn report_timezone(&self) -> anyhow::Result<chrono_tz::Tz> {
            let name = self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
            name.parse::<chrono_tz::Tz>()
                .map_err(|err| anyhow::anyhow!("invalid WATCH_TIMEZONE {name:?}: {err}"))
        }
    }
}
