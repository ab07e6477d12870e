//! Prompt text for the extraction tasks
//!
//! Each task pairs a system prompt with a user instruction. The instructions
//! spell out the JSON keys the normalizer reads first; aliases in
//! `normalize` cover models that ignore them.

/// Sampling temperature for image and file reads
pub const VISION_TEMPERATURE: f32 = 0.2;

/// Sampling temperature for free-text notes
pub const TEXT_TEMPERATURE: f32 = 0.1;

pub const RECEIPT_SYSTEM: &str = "You are a finance assistant that reads receipts and payment \
screenshots and reports the amount the customer actually paid. Respond with compact JSON only.";

pub const RECEIPT_USER: &str = "Read this receipt or SMS screenshot. Respond with a JSON array \
(always an array, even for a single item) of the payment amounts you can see, and make sure the \
final total payable is one of the items. For each item return: date (YYYY-MM-DD from the \
screenshot; do NOT invent a future date), amount (positive number, use decimals), currency \
(ISO 4217, default USD), category (Food, Rent, Grocery, Travel, Shopping, Utilities, Other), \
paymentMethod (Cash, Credit Card, Debit Card, UPI, Other), description (merchant + a few \
words). Ignore account balances. Never output zero or negative amounts. JSON array only.";

pub const NOTE_SYSTEM: &str =
    "You are a finance assistant that extracts expense transactions from natural language notes.";

pub const NOTE_USER: &str = "Read the following note and extract one expense transaction. \
Return a JSON object with keys: date (YYYY-MM-DD, default today if missing), amount (number), \
currency (ISO 4217, default USD), category (Food, Rent, Grocery, Travel, Shopping, Utilities, \
Other), paymentMethod (Cash, Credit Card, Debit Card, UPI, Other), description (short \
merchant or intent). JSON only.";

pub const DOCUMENT_SYSTEM: &str = "You are an assistant that reads official documents (passport, \
visa, driver license, ID cards, insurance) and extracts expiry details. Respond with concise JSON \
only.";

pub const DOCUMENT_USER: &str = "Read this document or screenshot and extract every document you \
can. Return a JSON array (always an array). Each item must include: title (short document title \
or holder name + document type), docType (passport, visa, driving license, ID, insurance, other), \
expirationDate (YYYY-MM-DD), number (document number if visible), notes (any country or type \
info). If a date is missing, leave it empty instead of guessing. JSON array only.";

pub const POLICY_SYSTEM: &str = "You extract insurance policy details and premium due dates from \
photos, screenshots and policy documents. Respond with concise JSON only.";

pub const POLICY_USER: &str = "Read this file and extract every insurance policy you see. Always \
respond with a JSON array. Each item must include: policyName (plan name), provider (insurer or \
company), policyType (life, health, auto, home, other), policyNumber, premiumAmount (numeric, 0 \
if missing), currency (ISO 4217, default USD), paymentFrequency (Monthly, Quarterly, Yearly, \
One-time), nextPaymentDate (YYYY-MM-DD if present), startDate, endDate, notes (coverage \
highlights). Do not invent dates; leave them empty if not visible. JSON array only.";
