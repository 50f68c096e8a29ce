//! API models
//!
//! Rust structs representing the backend's bill and reminder records.
//! All models use serde; field names follow the backend's JSON.

use crate::config::{BILL_CATEGORIES, MAX_DAYS_BEFORE, MIN_DAYS_BEFORE};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bill category, one of a fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Utilities,
    #[serde(rename = "Rent/Mortgage")]
    RentMortgage,
    Insurance,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Loan,
    Subscription,
    Medical,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Utilities,
        Category::RentMortgage,
        Category::Insurance,
        Category::CreditCard,
        Category::Loan,
        Category::Subscription,
        Category::Medical,
        Category::Other,
    ];

    /// Display label, identical to the wire value
    pub fn label(self) -> &'static str {
        match self {
            Category::Utilities => BILL_CATEGORIES[0],
            Category::RentMortgage => BILL_CATEGORIES[1],
            Category::Insurance => BILL_CATEGORIES[2],
            Category::CreditCard => BILL_CATEGORIES[3],
            Category::Loan => BILL_CATEGORIES[4],
            Category::Subscription => BILL_CATEGORIES[5],
            Category::Medical => BILL_CATEGORIES[6],
            Category::Other => BILL_CATEGORIES[7],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("Unknown category: {}", s)))
    }
}

/// Derived bill status; also the status tab of the bill list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Upcoming,
    Overdue,
    Paid,
}

impl BillStatus {
    pub const ALL: [BillStatus; 3] = [BillStatus::Upcoming, BillStatus::Overdue, BillStatus::Paid];

    /// Status as a pure function of payment state, due date and today's date
    pub fn of(paid: bool, due_date: NaiveDate, today: NaiveDate) -> Self {
        if paid {
            BillStatus::Paid
        } else if due_date >= today {
            BillStatus::Upcoming
        } else {
            BillStatus::Overdue
        }
    }

    /// Value of the `status` query parameter
    pub fn as_query(self) -> &'static str {
        match self {
            BillStatus::Upcoming => "upcoming",
            BillStatus::Overdue => "overdue",
            BillStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for BillStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Ok(BillStatus::Upcoming),
            "overdue" => Ok(BillStatus::Overdue),
            "paid" => Ok(BillStatus::Paid),
            other => Err(AppError::Validation(format!("Unknown bill status: {}", other))),
        }
    }
}

/// Sort key for the displayed bill list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Amount,
    #[default]
    DueDate,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amount" => Ok(SortField::Amount),
            "due_date" | "duedate" | "due" => Ok(SortField::DueDate),
            other => Err(AppError::Validation(format!("Unknown sort field: {}", other))),
        }
    }
}

/// A payable obligation as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "wire::amount")]
    pub amount: f64,
    #[serde(with = "wire::date")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub paid: bool,
}

impl Bill {
    /// Status of this bill as of `today`
    pub fn status_on(&self, today: NaiveDate) -> BillStatus {
        BillStatus::of(self.paid, self.due_date, today)
    }
}

/// Unvalidated bill form contents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillDraft {
    pub name: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub category: Category,
    pub notes: String,
    pub is_recurring: bool,
}

impl BillDraft {
    pub fn new(name: impl Into<String>, amount: f64, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            due_date: Some(due_date),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    /// Validate the draft and produce the request body.
    ///
    /// This is the only way to obtain a [`BillPayload`], so nothing
    /// unvalidated can reach the network.
    pub fn to_payload(&self) -> Result<BillPayload<'_>> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Bill name is required".to_string()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AppError::Validation("Valid amount is required".to_string()));
        }
        let due_date = self
            .due_date
            .ok_or_else(|| AppError::Validation("Due date is required".to_string()))?;

        Ok(BillPayload {
            name,
            amount: self.amount,
            due_date,
            category: self.category,
            notes: &self.notes,
            is_recurring: self.is_recurring,
        })
    }
}

impl From<&Bill> for BillDraft {
    fn from(bill: &Bill) -> Self {
        Self {
            name: bill.name.clone(),
            amount: bill.amount,
            due_date: Some(bill.due_date),
            category: bill.category,
            notes: bill.notes.clone().unwrap_or_default(),
            is_recurring: bill.is_recurring,
        }
    }
}

/// Validated body of `POST /api/bills` and `PUT /api/bills/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct BillPayload<'a> {
    pub name: &'a str,
    pub amount: f64,
    #[serde(with = "wire::date")]
    pub due_date: NaiveDate,
    pub category: Category,
    pub notes: &'a str,
    pub is_recurring: bool,
}

impl BillPayload<'_> {
    /// Bill as the backend would store it under `id`
    pub fn into_bill(self, id: String) -> Bill {
        Bill {
            id,
            name: self.name.to_string(),
            amount: self.amount,
            due_date: self.due_date,
            category: self.category,
            notes: if self.notes.is_empty() {
                None
            } else {
                Some(self.notes.to_string())
            },
            is_recurring: self.is_recurring,
            paid: false,
        }
    }
}

/// Reminder policy attached to a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub bill_id: String,
    #[serde(default = "default_days_before")]
    pub days_before: u32,
    #[serde(default)]
    pub send_email: bool,
    #[serde(default, deserialize_with = "wire::string_or_null")]
    pub email: String,
}

fn default_days_before() -> u32 {
    crate::config::DEFAULT_DAYS_BEFORE
}

/// Unvalidated reminder form contents
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderDraft {
    pub bill_id: String,
    pub days_before: u32,
    pub email: String,
    pub send_email: bool,
}

impl ReminderDraft {
    pub fn new(
        bill_id: impl Into<String>,
        days_before: u32,
        email: impl Into<String>,
        send_email: bool,
    ) -> Self {
        Self {
            bill_id: bill_id.into(),
            days_before,
            email: email.into(),
            send_email,
        }
    }

    /// Validate the draft and produce the request body
    pub fn to_payload(&self) -> Result<ReminderPayload<'_>> {
        let bill_id = self.bill_id.trim();
        if bill_id.is_empty() {
            return Err(AppError::Validation("Please select a bill".to_string()));
        }
        let email = self.email.trim();
        if self.send_email && email.is_empty() {
            return Err(AppError::Validation(
                "Please enter an email address".to_string(),
            ));
        }
        if !(MIN_DAYS_BEFORE..=MAX_DAYS_BEFORE).contains(&self.days_before) {
            return Err(AppError::Validation(format!(
                "Days before due date must be between {} and {}",
                MIN_DAYS_BEFORE, MAX_DAYS_BEFORE
            )));
        }

        Ok(ReminderPayload {
            bill_id,
            days_before: self.days_before,
            email: if self.send_email { email } else { "" },
            send_email: self.send_email,
        })
    }
}

/// Validated body of `POST /api/reminders`
#[derive(Debug, Clone, Serialize)]
pub struct ReminderPayload<'a> {
    pub bill_id: &'a str,
    pub days_before: u32,
    pub email: &'a str,
    pub send_email: bool,
}

impl ReminderPayload<'_> {
    pub fn into_reminder(self, id: String) -> Reminder {
        Reminder {
            id,
            bill_id: self.bill_id.to_string(),
            days_before: self.days_before,
            send_email: self.send_email,
            email: self.email.to_string(),
        }
    }
}

/// Lenient decoders for values the backend stores loosely
pub(crate) mod wire {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    /// Amounts arrive as numbers, or as strings when typed into a form
    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid amount: {}", s))),
        }
    }

    pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
            .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|d| d.date())
            })
    }

    /// Dates are sent as `YYYY-MM-DD`; responses may carry a full timestamp
    pub mod date {
        use chrono::NaiveDate;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            super::parse_date(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid due date: {}", raw)))
        }
    }
}
