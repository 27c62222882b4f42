//! Injectable sources of dates and account-number tokens.
use chrono::{Local, NaiveDate};
use uuid::Uuid;

/// Clock abstracts access to the current date so the registry stays deterministic in tests.
pub trait Clock: Send {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the local system date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Produces the token that follows an account's type tag.
pub trait AccountNumberGenerator: Send {
    fn next_token(&mut self) -> String;
}

/// Eight upper-case hex characters taken from a random UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl AccountNumberGenerator for RandomTokens {
    fn next_token(&mut self) -> String {
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    }
}

/// Zero-padded counter tokens: `00000001`, `00000002`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialTokens {
    next: u64,
}

impl SequentialTokens {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountNumberGenerator for SequentialTokens {
    fn next_token(&mut self) -> String {
        self.next += 1;
        format!("{:08}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_shape() {
        let token = RandomTokens.next_token();
        assert_eq!(token.len(), 8);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_sequential_tokens() {
        let mut tokens = SequentialTokens::new();
        assert_eq!(tokens.next_token(), "00000001");
        assert_eq!(tokens.next_token(), "00000002");
    }
}
