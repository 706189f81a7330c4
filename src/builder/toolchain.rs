//! Meson machine-file generation from settings and options.
//!
//! The generated file is the only way settings and options reach the build
//! tool. Its content is a pure function of the settings, the options and the
//! build machine: no timestamps, no absolute paths, fixed key order. That
//! makes its SHA-256 usable as a configure fingerprint.

use std::path::{Path, PathBuf};

use crate::core::errors::RecipeError;
use crate::core::options::Options;
use crate::core::settings::{Arch, BuildMachine, BuildType, Compiler, Os, Settings};
use crate::core::stage::Stage;
use crate::util::fs::{ensure_dir, write_if_changed};
use crate::util::hash::sha256_str;

/// Native machine file name.
pub const NATIVE_FILE: &str = "quay_meson_native.ini";

/// Cross machine file name.
pub const CROSS_FILE: &str = "quay_meson_cross.ini";

/// Whether the machine file describes a native or a cross build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineFileKind {
    Native,
    Cross,
}

impl MachineFileKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            MachineFileKind::Native => NATIVE_FILE,
            MachineFileKind::Cross => CROSS_FILE,
        }
    }

    /// The `meson setup` flag that loads this kind of file.
    pub fn meson_flag(&self) -> &'static str {
        match self {
            MachineFileKind::Native => "--native-file",
            MachineFileKind::Cross => "--cross-file",
        }
    }
}

/// A generated toolchain file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainFile {
    pub path: PathBuf,
    pub kind: MachineFileKind,
    pub content: String,
    /// SHA-256 of `content`
    pub fingerprint: String,
}

/// How a target maps onto Meson's machine description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMapping {
    pub triple: String,
    pub system: &'static str,
    pub cpu_family: &'static str,
    pub cpu: &'static str,
    pub endian: &'static str,
}

/// Map settings onto a target, or explain why there is no mapping.
pub fn target_mapping(settings: &Settings) -> Result<TargetMapping, RecipeError> {
    let unsupported = |reason: &str| RecipeError::UnsupportedSettings {
        settings: settings.to_string(),
        reason: reason.to_string(),
    };

    match (settings.compiler, settings.os) {
        (Compiler::Msvc, os) if os != Os::Windows => {
            return Err(unsupported("msvc only targets Windows"))
        }
        (Compiler::AppleClang, os) if os != Os::Macos => {
            return Err(unsupported("apple-clang only targets Macos"))
        }
        (Compiler::Gcc | Compiler::AppleClang | Compiler::Msvc, Os::Android) => {
            return Err(unsupported("Android builds require clang"))
        }
        _ => {}
    }

    let arch_prefix = match settings.arch {
        Arch::X86 => "i686",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "armv7",
        Arch::Armv8 => "aarch64",
        Arch::Riscv64 => "riscv64gc",
    };

    let triple = match (settings.os, settings.arch) {
        (Os::Macos, Arch::X86 | Arch::Armv7 | Arch::Riscv64) => {
            return Err(unsupported("Macos only supports x86_64 and armv8"))
        }
        (Os::Windows | Os::Android, Arch::Riscv64) => {
            return Err(unsupported("riscv64 is not supported on this os"))
        }
        (Os::Linux, Arch::Armv7) => "armv7-unknown-linux-gnueabihf".to_string(),
        (Os::Linux, _) => format!("{}-unknown-linux-gnu", arch_prefix),
        (Os::Macos, _) => format!("{}-apple-darwin", arch_prefix),
        (Os::Windows, Arch::Armv7) => "thumbv7a-pc-windows-msvc".to_string(),
        (Os::Windows, _) => {
            let env = if settings.compiler == Compiler::Msvc {
                "msvc"
            } else {
                "gnu"
            };
            format!("{}-pc-windows-{}", arch_prefix, env)
        }
        (Os::FreeBSD, _) => format!("{}-unknown-freebsd", arch_prefix),
        (Os::Android, Arch::Armv7) => "armv7-linux-androideabi".to_string(),
        (Os::Android, _) => format!("{}-linux-android", arch_prefix),
    };

    if settings.os == Os::Windows && settings.arch == Arch::Armv7 && settings.compiler != Compiler::Msvc {
        return Err(unsupported("armv7 Windows builds require msvc"));
    }

    let system = match settings.os {
        Os::Linux => "linux",
        Os::Macos => "darwin",
        Os::Windows => "windows",
        Os::FreeBSD => "freebsd",
        Os::Android => "android",
    };

    let (cpu_family, cpu) = match settings.arch {
        Arch::X86 => ("x86", "i686"),
        Arch::X86_64 => ("x86_64", "x86_64"),
        Arch::Armv7 => ("arm", "armv7"),
        Arch::Armv8 => ("aarch64", "aarch64"),
        Arch::Riscv64 => ("riscv64", "riscv64"),
    };

    Ok(TargetMapping {
        triple,
        system,
        cpu_family,
        cpu,
        endian: "little",
    })
}

fn meson_buildtype(build_type: BuildType) -> &'static str {
    match build_type {
        BuildType::Debug => "debug",
        BuildType::Release => "release",
        BuildType::RelWithDebInfo => "debugoptimized",
        BuildType::MinSizeRel => "minsize",
    }
}

/// (c, ar, strip) executables for a compiler family.
fn binaries(compiler: Compiler) -> (&'static str, &'static str, Option<&'static str>) {
    match compiler {
        Compiler::Gcc => ("gcc", "gcc-ar", Some("strip")),
        Compiler::Clang => ("clang", "llvm-ar", Some("llvm-strip")),
        Compiler::AppleClang => ("clang", "ar", Some("strip")),
        Compiler::Msvc => ("cl", "lib", None),
    }
}

/// Generates Meson machine files.
#[derive(Debug, Clone)]
pub struct ToolchainGenerator<'a> {
    settings: &'a Settings,
    options: &'a Options,
    build_machine: Option<BuildMachine>,
}

impl<'a> ToolchainGenerator<'a> {
    /// Create a generator; `build_machine` decides native vs cross.
    ///
    /// With no build machine the target is assumed to be native.
    pub fn new(settings: &'a Settings, options: &'a Options, build_machine: Option<BuildMachine>) -> Self {
        ToolchainGenerator {
            settings,
            options,
            build_machine,
        }
    }

    /// Which kind of file these inputs produce.
    pub fn kind(&self) -> MachineFileKind {
        match self.build_machine {
            Some(machine) if machine.is_cross_for(self.settings) => MachineFileKind::Cross,
            _ => MachineFileKind::Native,
        }
    }

    /// Render the machine file content.
    pub fn render(&self) -> Result<String, RecipeError> {
        let target = target_mapping(self.settings)?;
        let kind = self.kind();
        let (cc, ar, strip) = binaries(self.settings.compiler);

        let mut out = String::new();
        out.push_str("# Meson machine file generated by quay. Do not edit.\n");
        out.push_str(&format!("# settings: {}\n", self.settings));
        out.push('\n');

        out.push_str("[constants]\n");
        out.push_str(&format!("target_triple = '{}'\n", target.triple));
        out.push('\n');

        out.push_str("[binaries]\n");
        out.push_str(&format!("c = '{}'\n", cc));
        out.push_str(&format!("ar = '{}'\n", ar));
        if let Some(strip) = strip {
            out.push_str(&format!("strip = '{}'\n", strip));
        }
        out.push('\n');

        out.push_str("[built-in options]\n");
        out.push_str(&format!("buildtype = '{}'\n", meson_buildtype(self.settings.build_type)));
        let link_mode = if self.options.shared() { "shared" } else { "static" };
        out.push_str(&format!("default_library = '{}'\n", link_mode));
        if self.settings.compiler == Compiler::Msvc {
            out.push_str("b_vscrt = 'from_buildtype'\n");
        }
        let clang_like = matches!(self.settings.compiler, Compiler::Clang | Compiler::AppleClang);
        if kind == MachineFileKind::Cross && clang_like {
            out.push_str(&format!("c_args = ['--target={}']\n", target.triple));
            out.push_str(&format!("c_link_args = ['--target={}']\n", target.triple));
        }

        if kind == MachineFileKind::Cross {
            out.push('\n');
            out.push_str("[host_machine]\n");
            out.push_str(&format!("system = '{}'\n", target.system));
            out.push_str(&format!("cpu_family = '{}'\n", target.cpu_family));
            out.push_str(&format!("cpu = '{}'\n", target.cpu));
            out.push_str(&format!("endian = '{}'\n", target.endian));
        }

        Ok(out)
    }

    /// Render and write the machine file into `build_folder`.
    ///
    /// A previous file of the same name is overwritten.
    pub fn generate(&self, build_folder: &Path) -> Result<ToolchainFile, RecipeError> {
        let content = self.render()?;
        let kind = self.kind();
        let path = build_folder.join(kind.file_name());

        let write_err = |e: anyhow::Error| {
            RecipeError::configuration(Stage::Generate, format!("{:#}", e))
        };
        ensure_dir(build_folder).map_err(write_err)?;
        write_if_changed(&path, content.as_bytes()).map_err(write_err)?;

        let fingerprint = sha256_str(&content);
        tracing::debug!("toolchain {} fingerprint {}", path.display(), &fingerprint[..16]);

        Ok(ToolchainFile {
            path,
            kind,
            content,
            fingerprint,
        })
    }
}
