// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{render, session::Session};
use anyhow::Result;
use pmd_config::AppConfig;

pub async fn execute(
    config: &AppConfig,
    from_block: Option<u64>,
    to_block: Option<u64>,
) -> Result<()> {
    let from_block = match from_block {
        Some(block) => block,
        None => config.chain().event_start_block()?,
    };

    let session = Session::connect(config).await?;
    let summary = session
        .gateway_from(from_block)
        .load_past_events(from_block, to_block)
        .await?;
    println!("{}", render::events(&summary));

    Ok(())
}
