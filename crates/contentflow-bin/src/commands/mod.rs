// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod run;
mod token;
mod validate;
mod version;

pub use run::run;
pub use token::issue_token;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => {
            one_shot_logging(&cli);
            validate::validate(&cli, args)
        }
        Commands::Version => version::version(&cli),
        Commands::IssueToken(args) => {
            one_shot_logging(&cli);
            token::issue_token(&cli, args)
        }
    }
}

/// One-shot commands print to stdout, so logs default to warnings only.
fn one_shot_logging(cli: &Cli) {
    init_logging(
        cli.effective_log_level("warn"),
        cli.log_format.unwrap_or_default(),
    );
}
