//! Domain models for Smart Desk
//!
//! Records serialize with camelCase keys, which is what the browser client
//! speaks. Datastore column names live in `datastore::rows`.

use serde::{Deserialize, Serialize};

/// Spending categories accepted on transactions and budgets
pub const CATEGORIES: &[&str] = &[
    "Food",
    "Rent",
    "Grocery",
    "Travel",
    "Shopping",
    "Utilities",
    "Other",
];

/// Payment methods accepted on transactions
pub const PAYMENT_METHODS: &[&str] = &["Cash", "Credit Card", "Debit Card", "UPI", "Other"];

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Typed in by the user
    Manual,
    /// Read from a receipt or document photo
    ImageAi,
    /// Parsed from a free-text note
    TextAi,
    /// Read from a policy photo or PDF
    PolicyAi,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::ImageAi => "Image AI",
            Self::TextAi => "Text AI",
            Self::PolicyAi => "Policy AI",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often a policy premium is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
    #[serde(rename = "One-time")]
    OneTime,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] =
        [Self::Monthly, Self::Quarterly, Self::Yearly, Self::OneTime];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
            Self::OneTime => "One-time",
        }
    }

    /// Case-insensitive match, falling back to Monthly for anything unknown
    pub fn sanitize(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl std::str::FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown payment frequency: {}", s))
    }
}

impl std::fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ========== Transactions ==========

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub payment_method: String,
    pub description: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

/// A validated expense ready to insert, or an AI-extracted candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub payment_method: String,
    pub description: String,
    pub source: String,
}

impl NewTransaction {
    /// Attach datastore identity
    pub fn into_record(self, id: String, created_time: Option<String>) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            payment_method: self.payment_method,
            description: self.description,
            source: self.source,
            created_time,
        }
    }
}

// ========== Budgets ==========

/// Monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub monthly_limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: String,
    pub monthly_limit: f64,
}

/// A budget with its current-month consumption
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
    /// Current month, e.g. "2024-05-01 → 2024-05-31"
    pub period: String,
}

// ========== Documents ==========

/// An identity or official document with an expiry date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub doc_type: String,
    pub expiration_date: String,
    pub number: String,
    pub notes: String,
    pub source: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    pub doc_type: String,
    pub expiration_date: String,
    pub number: String,
    pub notes: String,
    pub source: String,
    #[serde(default)]
    pub email: String,
}

impl NewDocument {
    pub fn into_record(self, id: String, created_time: Option<String>) -> Document {
        Document {
            id,
            title: self.title,
            doc_type: self.doc_type,
            expiration_date: self.expiration_date,
            number: self.number,
            notes: self.notes,
            source: self.source,
            email: self.email,
            created_time,
        }
    }
}

// ========== Policies ==========

/// An insurance policy with a recurring premium
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    pub policy_name: String,
    pub provider: String,
    pub policy_type: String,
    pub policy_number: String,
    pub premium_amount: f64,
    pub currency: String,
    pub payment_frequency: PaymentFrequency,
    pub start_date: String,
    pub end_date: String,
    pub next_payment_date: String,
    pub notes: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    pub policy_name: String,
    pub provider: String,
    pub policy_type: String,
    pub policy_number: String,
    pub premium_amount: f64,
    pub currency: String,
    pub payment_frequency: PaymentFrequency,
    pub start_date: String,
    pub end_date: String,
    pub next_payment_date: String,
    pub notes: String,
    pub source: String,
}

impl NewPolicy {
    pub fn into_record(self, id: String, created_time: Option<String>) -> Policy {
        Policy {
            id,
            policy_name: self.policy_name,
            provider: self.provider,
            policy_type: self.policy_type,
            policy_number: self.policy_number,
            premium_amount: self.premium_amount,
            currency: self.currency,
            payment_frequency: self.payment_frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            next_payment_date: self.next_payment_date,
            notes: self.notes,
            source: self.source,
            created_time,
        }
    }
}

// ========== Derived views ==========

/// Spend total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Spend total for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: String,
    pub amount: f64,
}

/// Dashboard aggregation over a list of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub total_spent: f64,
    pub average_daily: f64,
    pub top_category: CategoryTotal,
    pub category_breakdown: Vec<CategoryTotal>,
    pub trend: Vec<DailyTotal>,
    pub count: usize,
}

/// The soonest upcoming premium
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPayment {
    pub policy_name: String,
    pub provider: String,
    pub amount: f64,
    pub currency: String,
    pub payment_frequency: PaymentFrequency,
    pub date: String,
}

/// Policy dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInsights {
    pub total: usize,
    pub next_payment: Option<NextPayment>,
    pub due_soon_count: usize,
    pub due_soon: Vec<Policy>,
}
