/// Shared value types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation errors for customer-supplied contact details
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("l'adresse e-mail est vide")]
    EmptyEmail,
    #[error("l'adresse e-mail dépasse {max} caractères")]
    EmailTooLong { max: usize },
    #[error("l'adresse e-mail est invalide")]
    InvalidEmail,
    #[error("le numéro de téléphone est vide")]
    EmptyPhone,
    #[error("le numéro doit être un mobile guinéen (6XX XX XX XX)")]
    InvalidPhone,
}

/// A syntactically valid, lowercased email address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::EmptyEmail);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ContactError::EmailTooLong { max: Self::MAX_LENGTH });
        }

        let mut parts = s.split('@');
        let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => (local, domain),
            _ => return Err(ContactError::InvalidEmail),
        };
        if local.is_empty() || domain.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ContactError::InvalidEmail);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ContactError::InvalidEmail);
        }

        Ok(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A Guinean mobile number normalised to `+224XXXXXXXXX`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub const COUNTRY_CODE: &'static str = "224";

    /// Accepts `6XXXXXXXX`, `+2246XXXXXXXX` and `002246XXXXXXXX`, ignoring
    /// spaces, dashes, dots and parentheses.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ContactError::EmptyPhone);
        }

        let has_plus = trimmed.starts_with('+');
        let mut digits = String::with_capacity(trimmed.len());
        for c in trimmed.chars().skip(usize::from(has_plus)) {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(ContactError::InvalidPhone),
            }
        }

        let national = (if has_plus {
            digits.strip_prefix(Self::COUNTRY_CODE)
        } else if let Some(rest) = digits.strip_prefix("00") {
            rest.strip_prefix(Self::COUNTRY_CODE)
        } else if digits.len() == 12 {
            digits.strip_prefix(Self::COUNTRY_CODE)
        } else {
            Some(digits.as_str())
        })
        .ok_or(ContactError::InvalidPhone)?;

        if national.len() != 9 || !national.starts_with('6') {
            return Err(ContactError::InvalidPhone);
        }

        Ok(Self(format!("+{}{}", Self::COUNTRY_CODE, national)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `+224 6XX XX XX XX`
    pub fn display(&self) -> String {
        let national = &self.0[1 + Self::COUNTRY_CODE.len()..];
        format!(
            "+{} {} {} {} {}",
            Self::COUNTRY_CODE,
            &national[0..3],
            &national[3..5],
            &national[5..7],
            &national[7..9]
        )
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a customer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// French label shown to customers.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Confirmed => "Confirmée",
            OrderStatus::Shipped => "En cours de livraison",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Shipped) | (Confirmed, Cancelled) | (Shipped, Delivered)
        )
    }

    /// Statuses whose totals count towards revenue.
    pub fn counts_as_revenue(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    OrangeMoney,
    MtnMomo,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::OrangeMoney => "orange_money",
            PaymentMethod::MtnMomo => "mtn_momo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            "orange_money" => Some(PaymentMethod::OrangeMoney),
            "mtn_momo" => Some(PaymentMethod::MtnMomo),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Paiement à la livraison",
            PaymentMethod::OrangeMoney => "Orange Money",
            PaymentMethod::MtnMomo => "MTN Mobile Money",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(AdminRole::Admin),
            "super_admin" => Some(AdminRole::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignChannel {
    Email,
    Push,
}

impl CampaignChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignChannel::Email => "email",
            CampaignChannel::Push => "push",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(CampaignChannel::Email),
            "push" => Some(CampaignChannel::Push),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Sent,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Sending => "sending",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(CampaignStatus::Draft),
            "sending" => Some(CampaignStatus::Sending),
            "sent" => Some(CampaignStatus::Sent),
            "failed" => Some(CampaignStatus::Failed),
            _ => None,
        }
    }
}

/// Formats an amount of Guinean francs the French way: `150 000 GNF`.
pub fn format_gnf(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{} GNF", grouped)
    } else {
        format!("{} GNF", grouped)
    }
}

/// Lowercase ASCII slug, French accents folded, other characters collapsed to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
            'ç' => 'c',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' | 'õ' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ÿ' => 'y',
            'œ' => {
                push_slug_chunk(&mut slug, &mut pending_dash, "oe");
                continue;
            }
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            let mut buf = [0u8; 4];
            push_slug_chunk(&mut slug, &mut pending_dash, folded.encode_utf8(&mut buf));
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn push_slug_chunk(slug: &mut String, pending_dash: &mut bool, chunk: &str) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.push_str(chunk);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_lowercases_email() {
        let email = Email::parse("  Mariama.Diallo@Example.GN ").unwrap();
        assert_eq!(email.as_str(), "mariama.diallo@example.gn");
    }

    #[test]
    fn rejects_malformed_emails() {
        assert_eq!(Email::parse(""), Err(ContactError::EmptyEmail));
        assert_eq!(Email::parse("no-at-symbol"), Err(ContactError::InvalidEmail));
        assert_eq!(Email::parse("@example.com"), Err(ContactError::InvalidEmail));
        assert_eq!(Email::parse("a@b@c.com"), Err(ContactError::InvalidEmail));
        assert_eq!(Email::parse("user@localhost"), Err(ContactError::InvalidEmail));
        assert!(matches!(
            Email::parse(&format!("{}@example.com", "a".repeat(250))),
            Err(ContactError::EmailTooLong { .. })
        ));
    }

    #[test]
    fn normalises_guinean_numbers() {
        for input in ["622 12 34 56", "+224 622-12-34-56", "00224622123456", "224622123456", "(622) 12.34.56"] {
            assert_eq!(Phone::parse(input).unwrap().as_str(), "+224622123456", "input {input}");
        }
        assert_eq!(Phone::parse("622123456").unwrap().display(), "+224 622 12 34 56");
    }

    #[test]
    fn rejects_non_mobile_numbers() {
        assert_eq!(Phone::parse("   "), Err(ContactError::EmptyPhone));
        assert_eq!(Phone::parse("30 45 12 12"), Err(ContactError::InvalidPhone));
        assert_eq!(Phone::parse("+33612345678"), Err(ContactError::InvalidPhone));
        assert_eq!(Phone::parse("62212345"), Err(ContactError::InvalidPhone));
        assert_eq!(Phone::parse("622x23456"), Err(ContactError::InvalidPhone));
    }

    #[test]
    fn order_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert!(Cancelled.is_terminal());
        assert_eq!(OrderStatus::parse("shipped"), Some(Shipped));
        assert_eq!(OrderStatus::parse("lost"), None);
    }

    #[test]
    fn formats_francs_with_french_grouping() {
        assert_eq!(format_gnf(0), "0 GNF");
        assert_eq!(format_gnf(950), "950 GNF");
        assert_eq!(format_gnf(15_000), "15 000 GNF");
        assert_eq!(format_gnf(185_000), "185 000 GNF");
        assert_eq!(format_gnf(1_250_000), "1 250 000 GNF");
        assert_eq!(format_gnf(-20_000), "-20 000 GNF");
        assert_eq!(format_gnf(i64::MIN), "-9 223 372 036 854 775 808 GNF");
    }

    #[test]
    fn slugifies_french_names() {
        assert_eq!(slugify("T-shirt Élégance Noir"), "t-shirt-elegance-noir");
        assert_eq!(slugify("  Casquette   «Conakry» "), "casquette-conakry");
        assert_eq!(slugify("Sœur & Frère"), "soeur-frere");
        assert_eq!(slugify("!!!"), "");
    }
}
