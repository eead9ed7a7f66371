// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-token` command.

use contentflow_api::auth::JwtManager;
use contentflow_config::load_config;
use contentflow_core::UserId;

use crate::cli::{Cli, IssueTokenArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::api_config;

/// Prints a signed access token for the given user.
pub fn issue_token(cli: &Cli, args: IssueTokenArgs) -> BinResult<()> {
    let config = load_config(&cli.config)?;
    println!("{}", mint(&config, &args)?);
    Ok(())
}

fn mint(config: &contentflow_config::ContentFlowConfig, args: &IssueTokenArgs) -> BinResult<String> {
    let user_id = UserId::parse(&args.user).ok_or_else(|| {
        BinError::invalid_argument(format!("'{}' is not a valid user id", args.user))
    })?;

    let api = api_config(config)?;
    let ttl = args.ttl.unwrap_or(api.jwt.expiration_secs);
    if ttl <= 0 {
        return Err(BinError::invalid_argument("--ttl must be positive"));
    }

    let manager = JwtManager::new(api.jwt)?;
    let token = manager.create_token_with_ttl(user_id, ttl)?;

    tracing::debug!(user_id = %user_id, ttl, "Token issued");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentflow_config::{ContentFlowConfig, SecretValue};

    fn config() -> ContentFlowConfig {
        let mut config = ContentFlowConfig::default();
        config.jwt.secret = Some(SecretValue::new("0123456789abcdef0123456789abcdef"));
        config
    }

    fn args(user: &str, ttl: Option<i64>) -> IssueTokenArgs {
        IssueTokenArgs {
            user: user.to_string(),
            ttl,
        }
    }

    #[test]
    fn test_minted_token_validates() {
        let config = config();
        let user = "11111111-1111-4111-8111-111111111111";
        let token = mint(&config, &args(user, Some(120))).unwrap();

        let manager = JwtManager::new(api_config(&config).unwrap().jwt).unwrap();
        let claims = manager.validate_token(&token).unwrap().claims;
        assert_eq!(claims.sub, user);
        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn test_rejects_bad_user() {
        let err = mint(&config(), &args("not-a-uuid", None)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit::USAGE);
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        let user = "11111111-1111-4111-8111-111111111111";
        assert!(mint(&config(), &args(user, Some(0))).is_err());
    }
}
