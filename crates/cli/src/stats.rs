// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{render, session::Session};
use anyhow::Result;
use pmd_config::AppConfig;
use pmd_evm::RegularStat;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let session = Session::connect(config).await?;
    let mut gateway = session.gateway(config)?;
    gateway.refresh().await?;

    if let Some(summary) = gateway.summary() {
        println!("{}", render::summary(summary));
        println!();
        let stat = RegularStat::from_events(&summary.events, config.stats());
        println!("{}", render::stats(&stat));
    }

    Ok(())
}
