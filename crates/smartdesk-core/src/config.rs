//! Environment-driven configuration
//!
//! Read once at startup. Each external collaborator has its own section;
//! clients are built from a section with `from_config`, which returns None
//! when the section is incomplete so the server can start without it.
//!
//! Variables:
//! - `PORT` (default 3000)
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` or `SUPABASE_ANON_KEY`
//! - `SUPABASE_TABLE_NAME`, `SUPABASE_BUDGETS_TABLE_NAME`,
//!   `SUPABASE_DOCUMENTS_TABLE_NAME`, `SUPABASE_POLICIES_TABLE_NAME`
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`, `OPENAI_PDF_ENABLED`
//! - `DOCUMENT_EXPIRY_MONTHS` (default 8)
//! - `NOTIFY_FROM_EMAIL`, `NOTIFY_TO_EMAIL`, `NOTIFY_SMTP_HOST`,
//!   `NOTIFY_SMTP_PORT` (default 587), `NOTIFY_SMTP_USER`, `NOTIFY_SMTP_PASS`
//! - `SMARTDESK_API_KEYS` (comma-separated static bearer tokens)
//! - `SMARTDESK_ALLOWED_ORIGINS` (comma-separated CORS origins)

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_EXPIRY_MONTHS: u32 = 8;
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Datastore table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub transactions: String,
    pub budgets: String,
    pub documents: String,
    pub policies: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            transactions: "transactions".to_string(),
            budgets: "budgets".to_string(),
            documents: "documents".to_string(),
            policies: "policies".to_string(),
        }
    }
}

/// Supabase project: PostgREST for rows, Auth for sessions
#[derive(Debug, Clone, Default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    /// Service role key when present, anon key otherwise
    pub key: Option<String>,
    pub tables: TableNames,
}

impl SupabaseConfig {
    /// URL and key, when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.url.as_deref()?, self.key.as_deref()?))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub pdf_enabled: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            pdf_enabled: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    /// Default look-ahead for expiring documents
    pub expiry_months: u32,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            expiry_months: DEFAULT_EXPIRY_MONTHS,
        }
    }
}

/// SMTP delivery for the digests
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub from: Option<String>,
    pub to: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            host: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            pass: None,
        }
    }
}

impl MailerConfig {
    /// Implicit TLS on 465, STARTTLS otherwise
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some()
            && self.to.is_some()
            && self.host.is_some()
            && self.user.is_some()
            && self.pass.is_some()
    }
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase: SupabaseConfig,
    pub openai: OpenAIConfig,
    pub documents: DocumentsConfig,
    pub mailer: MailerConfig,
    pub api_keys: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            supabase: SupabaseConfig::default(),
            openai: OpenAIConfig::default(),
            documents: DocumentsConfig::default(),
            mailer: MailerConfig::default(),
            api_keys: Vec::new(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = parse_or(get("PORT"), "PORT", defaults.port);

        let tables = TableNames::default();
        let supabase = SupabaseConfig {
            url: get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            key: get("SUPABASE_SERVICE_ROLE_KEY").or_else(|| get("SUPABASE_ANON_KEY")),
            tables: TableNames {
                transactions: get("SUPABASE_TABLE_NAME").unwrap_or(tables.transactions),
                budgets: get("SUPABASE_BUDGETS_TABLE_NAME").unwrap_or(tables.budgets),
                documents: get("SUPABASE_DOCUMENTS_TABLE_NAME").unwrap_or(tables.documents),
                policies: get("SUPABASE_POLICIES_TABLE_NAME").unwrap_or(tables.policies),
            },
        };

        let openai = OpenAIConfig {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or(defaults.openai.model),
            base_url: get("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai.base_url),
            pdf_enabled: get("OPENAI_PDF_ENABLED")
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
        };

        let documents = DocumentsConfig {
            expiry_months: parse_or(
                get("DOCUMENT_EXPIRY_MONTHS"),
                "DOCUMENT_EXPIRY_MONTHS",
                defaults.documents.expiry_months,
            ),
        };

        let mailer = MailerConfig {
            from: get("NOTIFY_FROM_EMAIL"),
            to: get("NOTIFY_TO_EMAIL"),
            host: get("NOTIFY_SMTP_HOST"),
            port: parse_or(
                get("NOTIFY_SMTP_PORT"),
                "NOTIFY_SMTP_PORT",
                defaults.mailer.port,
            ),
            user: get("NOTIFY_SMTP_USER"),
            pass: get("NOTIFY_SMTP_PASS"),
        };

        Self {
            port,
            supabase,
            openai,
            documents,
            mailer,
            api_keys: split_list(get("SMARTDESK_API_KEYS")),
            allowed_origins: split_list(get("SMARTDESK_ALLOWED_ORIGINS")),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    value: Option<String>,
    name: &str,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
