// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod contract;
mod events;
mod gateway;
mod ledger;
mod log_fetcher;
mod patient;
mod stats;
mod wallet;

#[cfg(test)]
mod test_helpers;

pub use contract::*;
pub use events::*;
pub use gateway::*;
pub use ledger::*;
pub use patient::*;
pub use stats::*;
pub use wallet::*;
