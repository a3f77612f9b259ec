//! Mocked sign-in: OTP codes and password login with hard-coded demo
//! behavior. Nothing is persisted and no network is involved.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The code "sent" to every phone number in demo mode.
pub const DEMO_CODE: &str = "1234";
/// Seconds before another code may be requested for the same number.
pub const CODE_RESEND_COOLDOWN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("please enter a valid phone number")]
    InvalidPhone,
    #[error("code already sent; retry in {seconds_left}s")]
    CodeCooldown { seconds_left: i64 },
    #[error("no verification code was requested for this number")]
    CodeNotRequested,
    #[error("please enter the verification code")]
    CodeTooShort,
    #[error("please agree to the terms and conditions")]
    TermsRequired,
    #[error("please enter your email or phone")]
    MissingIdentifier,
    #[error("please enter your password")]
    MissingPassword,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentCode {
    pub code: String,
    pub expires_in_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub tier: String,
    pub session_count: u32,
}

fn demo_profile() -> UserProfile {
    UserProfile {
        id: "USER-2024-001".to_string(),
        name: "John Doe".to_string(),
        tier: "Pro".to_string(),
        session_count: 12,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub new_user: bool,
}

/// In-memory OTP bookkeeping keyed by phone number.
#[derive(Clone, Default)]
pub struct AuthService {
    pending: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid_phone(phone: &str) -> bool {
        phone.len() >= 10 && phone.chars().all(|c| c.is_ascii_digit())
    }

    /// "Send" a verification code. A number on cooldown cannot request
    /// another until the countdown runs out.
    pub fn request_code(&self, phone: &str, now: DateTime<Utc>) -> Result<SentCode, AuthError> {
        if !Self::is_valid_phone(phone) {
            return Err(AuthError::InvalidPhone);
        }

        let mut pending = self.pending.lock().unwrap();
        if let Some(sent_at) = pending.get(phone) {
            let elapsed = (now - *sent_at).num_seconds();
            if elapsed < CODE_RESEND_COOLDOWN_SECS {
                return Err(AuthError::CodeCooldown {
                    seconds_left: CODE_RESEND_COOLDOWN_SECS - elapsed,
                });
            }
        }
        pending.insert(phone.to_string(), now);

        Ok(SentCode {
            code: DEMO_CODE.to_string(),
            expires_in_secs: CODE_RESEND_COOLDOWN_SECS,
        })
    }

    /// Verify a code and sign in. Demo rule: any code of four or more
    /// digits passes once a code was requested; numbers starting with 138
    /// are treated as returning users.
    pub fn verify_code(
        &self,
        phone: &str,
        code: &str,
        agreed_to_terms: bool,
    ) -> Result<LoginOutcome, AuthError> {
        if !Self::is_valid_phone(phone) {
            return Err(AuthError::InvalidPhone);
        }
        if code.len() < 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::CodeTooShort);
        }
        if !agreed_to_terms {
            return Err(AuthError::TermsRequired);
        }

        let mut pending = self.pending.lock().unwrap();
        if pending.remove(phone).is_none() {
            return Err(AuthError::CodeNotRequested);
        }

        Ok(LoginOutcome {
            user: demo_profile(),
            new_user: !phone.starts_with("138"),
        })
    }

    pub fn password_login(
        &self,
        identifier: &str,
        password: &str,
        agreed_to_terms: bool,
    ) -> Result<LoginOutcome, AuthError> {
        if identifier.trim().is_empty() {
            return Err(AuthError::MissingIdentifier);
        }
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if !agreed_to_terms {
            return Err(AuthError::TermsRequired);
        }

        Ok(LoginOutcome {
            user: demo_profile(),
            new_user: false,
        })
    }
}
