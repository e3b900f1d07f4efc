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
    let account = session.wallet().connect().await?;
    println!("{}", account);

    Ok(())
}
