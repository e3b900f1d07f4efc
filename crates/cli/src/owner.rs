// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::session::Session;
use anyhow::Result;
use pmd_config::AppConfig;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let session = Session::connect(config).await?;
    // no replay, the start block is irrelevant
    let owner = session.gateway_from(0).get_owner().await?;
    println!("{}", owner);

    Ok(())
}
