//! Ordered, fail-fast execution of command batches.

use crate::error::Result;
use crate::ssh::RemoteSession;

/// Run every command in order, stopping at the first failure.
///
/// Later commands may depend on earlier side effects (a repository key must
/// land before the package index update that references it), so there is no
/// reordering and no retry. Commands already applied before a failure are
/// left as-is on the remote host; there is no rollback model.
pub fn run_all(session: &dyn RemoteSession, commands: &[String]) -> Result<()> {
    for command in commands {
        session.run(command)?;
    }
    Ok(())
}
