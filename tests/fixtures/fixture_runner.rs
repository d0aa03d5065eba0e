use anyhow::Result;
use rand::Rng;
use rstest::*;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn rid() -> String {
    let mut rng = rand::rng();
    let rid: String = (0..10)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    rid
}

pub fn get_store_chroot_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_store-chroot"))
}

/// Runs the store-chroot binary with a private scratch directory. Sandbox
/// roots are created inside the scratch directory so they are removed along
/// with it.
pub struct ChrootRunner {
    pub bin: PathBuf,
    pub scratch: PathBuf,
    pub store: PathBuf,
    pub roots: PathBuf,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub last_code: Option<i32>,
    pub last_stdout: String,
    pub last_stderr: String,
}

impl ChrootRunner {
    pub fn new() -> Result<Self> {
        let scratch = std::env::temp_dir()
            .join(format!("store-chroot-test-{}", rid()));
        std::fs::create_dir_all(&scratch)?;
        // The sandbox reports its working directory physically
        let scratch = scratch.canonicalize()?;
        let store = scratch.join("store");
        let roots = scratch.join("roots");
        std::fs::create_dir_all(&store)?;
        std::fs::create_dir_all(&roots)?;

        Ok(Self {
            bin: get_store_chroot_bin(),
            scratch,
            store,
            roots,
            cwd: None,
            env: Vec::new(),
            last_code: None,
            last_stdout: String::new(),
            last_stderr: String::new(),
        })
    }

    pub fn store_str(&self) -> String {
        self.store.to_string_lossy().to_string()
    }

    /// Runs with `--no-config` and `--tmp-dir` pointing into the scratch
    /// directory, followed by `args`.
    pub fn run(&mut self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--no-config");
        cmd.arg(format!("--tmp-dir={}", self.roots.display()));
        cmd.args(args);
        for key in [
            "STORE_CHROOT_CONFIG",
            "STORE_CHROOT_LOG_LEVEL",
            "STORE_CHROOT_STORE_NAME",
            "STORE_CHROOT_CONF_DIR",
            "STORE_CHROOT_TMP_DIR",
            "COMPLETE",
        ] {
            cmd.env_remove(key);
        }
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        println!(
            "Running command: {} {}",
            cmd.get_program().to_string_lossy(),
            cmd.get_args()
                .map(|c| c.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = cmd.output()?;
        self.last_code = output.status.code();
        self.last_stdout = String::from_utf8_lossy(&output.stdout).to_string();
        self.last_stderr = String::from_utf8_lossy(&output.stderr).to_string();
        println!("stdout: {}", self.last_stdout);
        println!("stderr: {}", self.last_stderr);
        Ok(output)
    }

    pub fn pass(&mut self, args: &[&str]) -> bool {
        self.run(args).is_ok() && self.last_code == Some(0)
    }

    pub fn xfail(&mut self, args: &[&str]) -> bool {
        self.run(args).is_ok() && self.last_code != Some(0)
    }

    /// Runs `command` inside a sandbox using the scratch store.
    pub fn sandboxed(&mut self, command: &[&str]) -> Result<Option<i32>> {
        let store = self.store_str();
        let mut args = vec![store.as_str()];
        args.extend_from_slice(command);
        self.run(&args)?;
        Ok(self.last_code)
    }

    /// Unprivileged user namespaces can be disabled by the host (sysctl,
    /// seccomp in containers), tests needing them bail out early.
    pub fn userns_available(&mut self) -> bool {
        let available = matches!(self.sandboxed(&["true"]), Ok(Some(0)));
        if !available {
            println!(
                "Skipping: unprivileged user namespaces unavailable: {}",
                self.last_stderr
            );
        }
        available
    }

    pub fn roots_created(&self) -> usize {
        std::fs::read_dir(&self.roots)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn error_lines(&self) -> Vec<&str> {
        self.last_stderr
            .lines()
            .filter(|line| line.contains("ERROR"))
            .collect()
    }
}

impl Drop for ChrootRunner {
    fn drop(&mut self) {
        // The mounts died with the sandboxed processes, only empty
        // directories and symlinks are left behind.
        if Path::new(&self.scratch).exists() {
            let _ = std::fs::remove_dir_all(&self.scratch);
        }
    }
}

#[fixture]
pub fn runner() -> ChrootRunner {
    #[allow(clippy::panic)]
    match ChrootRunner::new() {
        Ok(runner) => runner,
        Err(e) => panic!("Failed to set up test runner: {}", e),
    }
}
