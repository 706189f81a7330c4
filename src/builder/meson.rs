//! The build tool seam and its Meson implementation.
//!
//! The lifecycle only ever talks to a `BuildTool`. `MesonTool` runs the real
//! `meson` executable; tests substitute a recording fake.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::ToolchainFile;
use crate::util::process::{find_executable, FailureStatus, ProcessBuilder, ToolFailure};

/// Black-box operations the lifecycle needs from a build tool.
pub trait BuildTool {
    /// Tool name for logs.
    fn name(&self) -> &str;

    /// Configure `build` from `source` with the given toolchain.
    ///
    /// `wipe` asks the tool to discard an existing configuration first.
    fn configure(
        &self,
        source: &Path,
        build: &Path,
        toolchain: &ToolchainFile,
        wipe: bool,
    ) -> Result<(), ToolFailure>;

    /// Compile every target of a configured build folder.
    fn build(&self, build: &Path) -> Result<(), ToolFailure>;

    /// Install build artifacts under `package`.
    fn install(&self, build: &Path, package: &Path) -> Result<(), ToolFailure>;

    /// Whether `build` currently holds a configuration.
    fn is_configured(&self, build: &Path) -> bool;
}

/// Runs `meson setup`, `meson compile` and `meson install`.
#[derive(Debug, Clone)]
pub struct MesonTool {
    program: PathBuf,
    jobs: Option<usize>,
    verbose: bool,
}

impl MesonTool {
    /// Create a Meson driver using `program` (a path or a name on PATH).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        MesonTool {
            program: program.into(),
            jobs: None,
            verbose: false,
        }
    }

    /// Locate `meson` on PATH, falling back to the bare name.
    pub fn detect() -> Self {
        MesonTool::new(find_executable("meson").unwrap_or_else(|| PathBuf::from("meson")))
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Query `meson --version`.
    pub fn version(&self) -> Result<semver::Version, ToolFailure> {
        let out = ProcessBuilder::new(&self.program).arg("--version").exec()?;
        Ok(parse_meson_version(&out.stdout))
    }

    fn setup_args(source: &Path, build: &Path, toolchain: &ToolchainFile, wipe: bool) -> Vec<String> {
        let mut args = vec!["setup".to_string()];
        if wipe {
            args.push("--wipe".to_string());
        }
        args.push(toolchain.kind.meson_flag().to_string());
        args.push(toolchain.path.display().to_string());
        args.push("--prefix=/".to_string());
        args.push("--libdir=lib".to_string());
        args.push("--includedir=include".to_string());
        args.push("--bindir=bin".to_string());
        args.push(build.display().to_string());
        args.push(source.display().to_string());
        args
    }

    fn compile_args(&self, build: &Path) -> Vec<String> {
        let mut args = vec!["compile".to_string(), "-C".to_string(), build.display().to_string()];
        if let Some(jobs) = self.jobs {
            args.push("-j".to_string());
            args.push(jobs.to_string());
        }
        if self.verbose {
            args.push("-v".to_string());
        }
        args
    }

    fn run(&self, args: Vec<String>) -> Result<(), ToolFailure> {
        let pb = ProcessBuilder::new(&self.program).args(args);
        tracing::debug!("Meson: {}", pb.display_command());

        match pb.exec() {
            Ok(out) => {
                if self.verbose {
                    for line in out.stdout.lines() {
                        tracing::debug!("{}", line);
                    }
                }
                Ok(())
            }
            Err(mut failure) if failure.status == FailureStatus::NotStarted => {
                failure.output = format!("{}\n{}", failure.output, meson_install_hint());
                Err(failure)
            }
            Err(failure) => Err(failure),
        }
    }
}

impl Default for MesonTool {
    fn default() -> Self {
        MesonTool::detect()
    }
}

impl BuildTool for MesonTool {
    fn name(&self) -> &str {
        "meson"
    }

    fn configure(
        &self,
        source: &Path,
        build: &Path,
        toolchain: &ToolchainFile,
        wipe: bool,
    ) -> Result<(), ToolFailure> {
        self.run(Self::setup_args(source, build, toolchain, wipe))
    }

    fn build(&self, build: &Path) -> Result<(), ToolFailure> {
        self.run(self.compile_args(build))
    }

    fn install(&self, build: &Path, package: &Path) -> Result<(), ToolFailure> {
        self.run(vec![
            "install".to_string(),
            "-C".to_string(),
            build.display().to_string(),
            "--destdir".to_string(),
            package.display().to_string(),
        ])
    }

    fn is_configured(&self, build: &Path) -> bool {
        build.join("meson-private").join("coredata.dat").is_file()
    }
}

/// Parse `meson --version` output like `1.3.0` or `1.4.0.dev1`.
fn parse_meson_version(stdout: &str) -> semver::Version {
    let trimmed = stdout.trim();
    let numeric = trimmed
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or(trimmed);

    let mut parts = numeric.split('.').map(|p| p.parse::<u64>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    semver::Version::new(major, minor, patch)
}

/// Platform-specific hint for installing Meson.
fn meson_install_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install Meson: brew install meson, pip install meson, or https://mesonbuild.com/Getting-meson.html"
    } else if cfg!(target_os = "windows") {
        "Install Meson: pip install meson, winget install meson, or https://mesonbuild.com/Getting-meson.html"
    } else {
        "Install Meson: pip install meson, apt install meson, or https://mesonbuild.com/Getting-meson.html"
    }
}
