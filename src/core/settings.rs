//! Host settings: the os/arch/compiler/build_type a recipe is built for.
//!
//! Settings are read-only inputs. Each field can come from `-s key=value`,
//! from the `[settings]` table of the config file, or from the running
//! machine, in that order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::errors::RecipeError;
use crate::util::process::find_executable;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Os {
    Linux,
    Macos,
    Windows,
    FreeBSD,
    Android,
}

impl Os {
    pub const ALL: [Os; 5] = [Os::Linux, Os::Macos, Os::Windows, Os::FreeBSD, Os::Android];

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::Windows => "Windows",
            Os::FreeBSD => "FreeBSD",
            Os::Android => "Android",
        }
    }

    /// The os the current process runs on.
    pub fn current() -> Option<Os> {
        match std::env::consts::OS {
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::Macos),
            "windows" => Some(Os::Windows),
            "freebsd" => Some(Os::FreeBSD),
            "android" => Some(Os::Android),
            _ => None,
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
    Riscv64,
}

impl Arch {
    pub const ALL: [Arch; 5] = [Arch::X86, Arch::X86_64, Arch::Armv7, Arch::Armv8, Arch::Riscv64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "armv8",
            Arch::Riscv64 => "riscv64",
        }
    }

    /// The architecture the current process runs on.
    pub fn current() -> Option<Arch> {
        match std::env::consts::ARCH {
            "x86" => Some(Arch::X86),
            "x86_64" => Some(Arch::X86_64),
            "arm" => Some(Arch::Armv7),
            "aarch64" => Some(Arch::Armv8),
            "riscv64" => Some(Arch::Riscv64),
            _ => None,
        }
    }
}

/// C compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Compiler {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl Compiler {
    pub const ALL: [Compiler; 4] = [
        Compiler::Gcc,
        Compiler::Clang,
        Compiler::AppleClang,
        Compiler::Msvc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::AppleClang => "apple-clang",
            Compiler::Msvc => "msvc",
        }
    }

    /// Guess the default compiler for an os from what is installed.
    fn detect(os: Os) -> Compiler {
        match os {
            Os::Macos => Compiler::AppleClang,
            Os::Windows if find_executable("cl").is_some() => Compiler::Msvc,
            Os::Android => Compiler::Clang,
            _ => {
                if let Ok(cc) = std::env::var("CC") {
                    if cc.contains("clang") {
                        return Compiler::Clang;
                    }
                    if cc.contains("gcc") {
                        return Compiler::Gcc;
                    }
                }
                if find_executable("gcc").is_none() && find_executable("clang").is_some() {
                    Compiler::Clang
                } else {
                    Compiler::Gcc
                }
            }
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

macro_rules! impl_setting_value {
    ($ty:ty, $key:literal) => {
        impl FromStr for $ty {
            type Err = RecipeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        let valid: Vec<_> = <$ty>::ALL.iter().map(|v| v.as_str()).collect();
                        RecipeError::invalid_input(format!(
                            "invalid value `{}` for setting `{}`, valid values: {}",
                            s,
                            $key,
                            valid.join(", ")
                        ))
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_setting_value!(Os, "os");
impl_setting_value!(Arch, "arch");
impl_setting_value!(Compiler, "compiler");
impl_setting_value!(BuildType, "build_type");

/// The full set of settings a recipe is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    pub build_type: BuildType,
}

impl Settings {
    /// Fill every unset field of `partial` from the running machine.
    pub fn resolve(partial: &PartialSettings) -> Result<Settings, RecipeError> {
        let os = match partial.os {
            Some(os) => os,
            None => Os::current().ok_or_else(|| {
                RecipeError::invalid_input(format!(
                    "cannot detect os `{}`, pass -s os=<value>",
                    std::env::consts::OS
                ))
            })?,
        };
        let arch = match partial.arch {
            Some(arch) => arch,
            None => Arch::current().ok_or_else(|| {
                RecipeError::invalid_input(format!(
                    "cannot detect arch `{}`, pass -s arch=<value>",
                    std::env::consts::ARCH
                ))
            })?,
        };
        let compiler = partial.compiler.unwrap_or_else(|| Compiler::detect(os));
        let build_type = partial.build_type.unwrap_or(BuildType::Release);

        Ok(Settings {
            os,
            arch,
            compiler,
            build_type,
        })
    }

    /// Settings as ordered `key=value` pairs.
    pub fn pairs(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("arch", self.arch.as_str()),
            ("build_type", self.build_type.as_str()),
            ("compiler", self.compiler.as_str()),
            ("os", self.os.as_str()),
        ])
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "os={} arch={} compiler={} build_type={}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}

/// Settings with some fields left to lower-precedence sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialSettings {
    pub os: Option<Os>,
    pub arch: Option<Arch>,
    pub compiler: Option<Compiler>,
    pub build_type: Option<BuildType>,
}

impl PartialSettings {
    /// Set a single setting from its key and textual value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        match key.trim() {
            "os" => self.os = Some(value.parse()?),
            "arch" => self.arch = Some(value.parse()?),
            "compiler" => self.compiler = Some(value.parse()?),
            "build_type" => self.build_type = Some(value.parse()?),
            other => {
                return Err(RecipeError::invalid_input(format!(
                    "unknown setting `{}`, valid settings: os, arch, compiler, build_type",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Parse `key=value` assignments, later ones winning.
    pub fn from_assignments<S: AsRef<str>>(items: &[S]) -> Result<Self, RecipeError> {
        let mut partial = PartialSettings::default();
        for item in items {
            let (key, value) = split_assignment(item.as_ref())?;
            partial.set(key, value)?;
        }
        Ok(partial)
    }

    /// Fields set here win; unset fields are taken from `fallback`.
    pub fn or(self, fallback: PartialSettings) -> PartialSettings {
        PartialSettings {
            os: self.os.or(fallback.os),
            arch: self.arch.or(fallback.arch),
            compiler: self.compiler.or(fallback.compiler),
            build_type: self.build_type.or(fallback.build_type),
        }
    }
}

/// The machine the build runs on, used to decide between native and cross files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildMachine {
    pub os: Os,
    pub arch: Arch,
}

impl BuildMachine {
    pub fn new(os: Os, arch: Arch) -> Self {
        BuildMachine { os, arch }
    }

    /// The machine this process runs on, if it is one we know.
    pub fn current() -> Option<BuildMachine> {
        Some(BuildMachine {
            os: Os::current()?,
            arch: Arch::current()?,
        })
    }

    /// Whether building for `settings` on this machine is a cross build.
    pub fn is_cross_for(&self, settings: &Settings) -> bool {
        self.os != settings.os || self.arch != settings.arch
    }
}

/// Split `key=value`, trimming whitespace around both halves.
pub(crate) fn split_assignment(item: &str) -> Result<(&str, &str), RecipeError> {
    match item.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim(), v.trim())),
        _ => Err(RecipeError::invalid_input(format!(
            "expected `key=value`, got `{}`",
            item
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("linux".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!("MACOS".parse::<Os>().unwrap(), Os::Macos);
        assert_eq!("Apple-Clang".parse::<Compiler>().unwrap(), Compiler::AppleClang);
        assert_eq!("relwithdebinfo".parse::<BuildType>().unwrap(), BuildType::RelWithDebInfo);
        assert_eq!(Arch::Armv8.to_string(), "armv8");
    }

    #[test]
    fn test_unknown_value_lists_valid_ones() {
        let err = "sparc".parse::<Arch>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`sparc`"));
        assert!(msg.contains("x86_64"));
    }

    #[test]
    fn test_assignments_and_precedence() {
        let cli = PartialSettings::from_assignments(&["os=Windows", "compiler=msvc"]).unwrap();
        let config = PartialSettings::from_assignments(&["os=Linux", "build_type=Debug"]).unwrap();

        let merged = cli.or(config);
        assert_eq!(merged.os, Some(Os::Windows));
        assert_eq!(merged.compiler, Some(Compiler::Msvc));
        assert_eq!(merged.build_type, Some(BuildType::Debug));
        assert_eq!(merged.arch, None);
    }

    #[test]
    fn test_bad_assignments() {
        assert!(PartialSettings::from_assignments(&["os"]).is_err());
        assert!(PartialSettings::from_assignments(&["=Linux"]).is_err());
        assert!(PartialSettings::from_assignments(&["cpu=x86"]).is_err());
    }

    #[test]
    fn test_resolve_keeps_explicit_fields() {
        let partial = PartialSettings {
            os: Some(Os::Linux),
            arch: Some(Arch::Armv8),
            compiler: Some(Compiler::Clang),
            build_type: None,
        };
        let settings = Settings::resolve(&partial).unwrap();
        assert_eq!(settings.arch, Arch::Armv8);
        assert_eq!(settings.compiler, Compiler::Clang);
        assert_eq!(settings.build_type, BuildType::Release);
    }

    #[test]
    fn test_cross_detection() {
        let machine = BuildMachine::new(Os::Linux, Arch::X86_64);
        let mut settings = Settings {
            os: Os::Linux,
            arch: Arch::X86_64,
            compiler: Compiler::Gcc,
            build_type: BuildType::Release,
        };
        assert!(!machine.is_cross_for(&settings));
        settings.arch = Arch::Armv8;
        assert!(machine.is_cross_for(&settings));
    }
}
