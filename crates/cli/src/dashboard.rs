// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{render, session::Session};
use anyhow::{bail, Result};
use pmd_config::AppConfig;
use pmd_evm::RegularStat;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let session = Session::connect(config).await?;
    let mut gateway = session.gateway(config)?;
    let report = gateway.mount().await;

    let mut failures = 0;
    match &report.owner {
        Ok(owner) => println!("Owner: {}", owner),
        Err(e) => {
            eprintln!("{}", e);
            failures += 1;
        }
    }
    if let Err(e) = &report.events {
        eprintln!("{}", e);
        failures += 1;
    }

    if let Some(summary) = gateway.summary() {
        println!("{}", render::events(summary));
        println!();
        let stat = RegularStat::from_events(&summary.events, config.stats());
        println!("{}", render::stats(&stat));
    }

    if failures > 0 {
        bail!("Dashboard loaded with {} error(s)", failures);
    }
    Ok(())
}
