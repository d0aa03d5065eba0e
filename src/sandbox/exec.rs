use super::{CONF_DIR_VAR, SandboxContext, Sys};
use crate::types::ChildOutcome;
use anyhow::Result;
use log::{debug, trace};

impl SandboxContext {
    /**
     * Runs the command inside the sandbox and waits for it. A command that
     * starts and fails is not our error, its outcome is returned as-is. Only
     * failing to start it is.
     */
    pub fn execute(
        &self,
        sys: &impl Sys,
        command: &[String],
    ) -> Result<ChildOutcome> {
        trace!("{}={}", CONF_DIR_VAR, self.conf_dir.display());
        sys.set_env(CONF_DIR_VAR, &self.conf_dir.to_string_lossy());

        // spawn already names the command in its errors
        let outcome = sys.spawn(command)?;
        debug!("{} finished: {}", command.join(" "), outcome);
        Ok(outcome)
    }
}
