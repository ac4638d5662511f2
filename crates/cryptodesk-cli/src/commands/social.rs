use cryptodesk_core::SocialToolkit;
use serde_json::Value;

use crate::cli::PostsArgs;
use crate::error::CliError;

use super::Session;

pub fn posts(args: &PostsArgs, session: &Session) -> Result<Value, CliError> {
    let mut toolkit = SocialToolkit::from_config(&session.config.api, &session.context);

    if args.all {
        return Ok(serde_json::to_value(
            toolkit.get_top_crypto_posts_aggregated(args.limit)?,
        )?);
    }
    Ok(serde_json::to_value(toolkit.get_top_crypto_posts(args.limit)?)?)
}
