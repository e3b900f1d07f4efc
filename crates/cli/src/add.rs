// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{render, session::Session};
use anyhow::Result;
use pmd_config::AppConfig;
use pmd_evm::PatientInput;

pub async fn execute(config: &AppConfig, address: String, age: String) -> Result<()> {
    let input = PatientInput::new(address, age);
    // Reject bad input before bothering the wallet
    input.validate()?;

    let session = Session::connect(config).await?;
    let mut gateway = session.gateway(config)?;
    gateway.connect(session.wallet()).await?;

    let report = gateway.submit_and_refresh(&input).await?;
    println!("{}", render::submission(&report.outcome));
    report.refresh?;
    if let Some(summary) = gateway.summary() {
        println!("{}", render::summary(summary));
    }

    Ok(())
}
