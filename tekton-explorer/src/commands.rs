//! Command-invocation boundary: where resolver errors become host notifications

use tekton_shared::Result;
use tracing::error;

use crate::context::AppContext;
use crate::node::NodeRef;
use crate::resolver::{Action, CommandResolver, Outcome};

/// Run `action` on behalf of the user.
///
/// Resolver errors and failed captured commands are shown through the host and
/// returned, so callers can still tell what happened.
pub async fn invoke(
    ctx: &AppContext,
    action: Action,
    context: Option<&NodeRef>,
) -> Result<Option<Outcome>> {
    let resolver = CommandResolver::new(ctx.clone());

    match resolver.run(action, context).await {
        Ok(Some(Outcome::Captured { command, result })) => {
            match &result.error {
                Some(message) => {
                    error!("'{}' failed: {}", command, message);
                    ctx.host.show_error_message(message);
                }
                None if !result.stdout.trim().is_empty() => {
                    ctx.host.show_info_message(result.stdout.trim());
                }
                None => {}
            }
            Ok(Some(Outcome::Captured { command, result }))
        }
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            error!("{:?} failed: {}", action, e);
            ctx.host.show_error_message(&e.to_string());
            Err(e)
        }
    }
}
