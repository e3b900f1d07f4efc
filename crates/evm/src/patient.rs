// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid Address")]
    InvalidAddress { input: String },

    #[error("Expected a positive number")]
    InvalidAge { input: String },
}

/// Raw form input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientInput {
    pub eth_address: String,
    pub age: String,
}

impl PatientInput {
    pub fn new(eth_address: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            eth_address: eth_address.into(),
            age: age.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidPatient, ValidationError> {
        Ok(ValidPatient {
            eth_address: validate_address(&self.eth_address)?,
            age: validate_age(&self.age)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPatient {
    pub eth_address: Address,
    /// Canonical decimal digits, always > 0
    pub age: String,
}

/// Accepts 40 hex digits with an optional `0x` prefix. Mixed case input must carry a valid
/// EIP-55 checksum.
pub fn validate_address(input: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress {
        input: input.to_string(),
    };

    let hex = input.strip_prefix("0x").unwrap_or(input);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    let prefixed = format!("0x{hex}");

    if has_lower && has_upper {
        Address::parse_checksummed(&prefixed, None).map_err(|_| invalid())
    } else {
        prefixed.parse::<Address>().map_err(|_| invalid())
    }
}

/// Accepts a positive integer of any width that fits a uint256
pub fn validate_age(input: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidAge {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let age = U256::from_str_radix(digits, 10).map_err(|_| invalid())?;
    if age.is_zero() {
        return Err(invalid());
    }
    Ok(age.to_string())
}

pub const DEFAULT_DISTRICT: &str = "Dhaka";
pub const DEFAULT_SYMPTOMS: &str = "No Symptoms";

/// Positional arguments of `addUser`. The form only collects the address and age; the medical
/// fields are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub eth_address: Address,
    pub age: String,
    pub gender: u8,
    pub vaccine_status: u8,
    pub district: String,
    pub symptoms: String,
    pub is_dead: bool,
    pub death_rate: u64,
}

impl From<ValidPatient> for PatientRecord {
    fn from(patient: ValidPatient) -> Self {
        Self {
            eth_address: patient.eth_address,
            age: patient.age,
            gender: 0,
            vaccine_status: 0,
            district: DEFAULT_DISTRICT.to_string(),
            symptoms: DEFAULT_SYMPTOMS.to_string(),
            is_dead: false,
            death_rate: 0,
        }
    }
}

impl PatientRecord {
    /// Arguments as text, to be coerced into the ABI's parameter types
    pub fn call_args(&self) -> Vec<String> {
        vec![
            self.eth_address.to_string(),
            self.age.clone(),
            self.gender.to_string(),
            self.vaccine_status.to_string(),
            self.district.clone(),
            self.symptoms.clone(),
            self.is_dead.to_string(),
            self.death_rate.to_string(),
        ]
    }
}
