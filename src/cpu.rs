//! CPU type identifiers.
//!
//! Values follow `mach/machine.h`.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::Error;

/// Matches any architecture.
///
/// Stored as-is; slice selection never treats it as a wildcard.
pub const CPU_TYPE_ANY: u32 = u32::MAX;
/// 64-bit ABI flag.
pub const CPU_ARCH_ABI64: u32 = 0x0100_0000;
/// ILP32 ABI on 64-bit hardware flag.
pub const CPU_ARCH_ABI64_32: u32 = 0x0200_0000;
/// Intel x86.
pub const CPU_TYPE_X86: u32 = 7;
/// Same as [`CPU_TYPE_X86`].
pub const CPU_TYPE_I386: u32 = CPU_TYPE_X86;
/// Intel x86-64.
pub const CPU_TYPE_X86_64: u32 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
/// HP PA-RISC.
pub const CPU_TYPE_HPPA: u32 = 11;
/// 32-bit ARM.
pub const CPU_TYPE_ARM: u32 = 12;
/// 64-bit ARM.
pub const CPU_TYPE_ARM64: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;
/// 64-bit ARM with 32-bit pointers.
pub const CPU_TYPE_ARM64_32: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64_32;
/// SPARC.
pub const CPU_TYPE_SPARC: u32 = 14;
/// 32-bit PowerPC.
pub const CPU_TYPE_POWERPC: u32 = 18;
/// 64-bit PowerPC.
pub const CPU_TYPE_POWERPC64: u32 = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

/// CPU type of the architecture this crate was compiled for.
#[cfg(any(target_arch = "aarch64", target_arch = "arm"))]
pub const HOST_CPU_TYPE: u32 = CPU_TYPE_ARM64;
/// CPU type of the architecture this crate was compiled for.
#[cfg(target_arch = "x86_64")]
pub const HOST_CPU_TYPE: u32 = CPU_TYPE_X86_64;
#[cfg(not(any(target_arch = "aarch64", target_arch = "arm", target_arch = "x86_64")))]
compile_error!("unsupported target architecture: only aarch64, arm and x86_64 are supported");

/// CPU type and subtype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(arbitrary::Arbitrary))]
pub struct CpuId {
    /// Processor family, optionally with ABI flags.
    pub cpu_type: u32,
    /// Processor variant within the family.
    pub cpu_sub_type: u32,
}

impl CpuId {
    /// Create new CPU identifier.
    pub const fn new(cpu_type: u32, cpu_sub_type: u32) -> Self {
        Self {
            cpu_type,
            cpu_sub_type,
        }
    }

    /// Canonical architecture name if the CPU type is known.
    pub fn arch(&self) -> Option<&'static str> {
        cpu_type_to_arch(self.cpu_type)
    }

    /// Returns `true` if the 64-bit ABI flag is set.
    pub const fn is_64_bit(&self) -> bool {
        self.cpu_type != CPU_TYPE_ANY && self.cpu_type & CPU_ARCH_ABI64 != 0
    }
}

impl Display for CpuId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.arch() {
            Some(arch) => f.write_str(arch),
            None => write!(
                f,
                "cputype {:#x} subtype {:#x}",
                self.cpu_type, self.cpu_sub_type
            ),
        }
    }
}

/// Convert architecture name to CPU type.
///
/// The name is case-insensitive.
pub fn arch_to_cpu_type(s: &str) -> Result<u32, Error> {
    let s = s.to_ascii_lowercase();
    match s.as_str() {
        "any" => Ok(CPU_TYPE_ANY),
        "hppa" => Ok(CPU_TYPE_HPPA),
        "arm" => Ok(CPU_TYPE_ARM),
        "arm64" => Ok(CPU_TYPE_ARM64),
        "arm64_32" => Ok(CPU_TYPE_ARM64_32),
        "sparc" => Ok(CPU_TYPE_SPARC),
        "x86" | "i386" => Ok(CPU_TYPE_X86),
        "x86_64" => Ok(CPU_TYPE_X86_64),
        "powerpc" | "ppc" => Ok(CPU_TYPE_POWERPC),
        "powerpc64" | "ppc64" => Ok(CPU_TYPE_POWERPC64),
        _ => Err(Error::UnknownArch(s)),
    }
}

/// Convert CPU type to its canonical architecture name.
pub fn cpu_type_to_arch(cpu_type: u32) -> Option<&'static str> {
    match cpu_type {
        CPU_TYPE_ANY => Some("any"),
        CPU_TYPE_HPPA => Some("hppa"),
        CPU_TYPE_ARM => Some("arm"),
        CPU_TYPE_ARM64 => Some("arm64"),
        CPU_TYPE_ARM64_32 => Some("arm64_32"),
        CPU_TYPE_SPARC => Some("sparc"),
        CPU_TYPE_X86 => Some("i386"),
        CPU_TYPE_X86_64 => Some("x86_64"),
        CPU_TYPE_POWERPC => Some("ppc"),
        CPU_TYPE_POWERPC64 => Some("ppc64"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use arbtest::arbtest;

    use super::*;

    #[test]
    fn known_arches() {
        assert_eq!(CPU_TYPE_ARM64, arch_to_cpu_type("arm64").unwrap());
        assert_eq!(CPU_TYPE_ARM64, arch_to_cpu_type("ARM64").unwrap());
        assert_eq!(0x100000c, arch_to_cpu_type("arm64").unwrap());
        assert_eq!(0x1000007, arch_to_cpu_type("x86_64").unwrap());
        assert_eq!(7, arch_to_cpu_type("i386").unwrap());
        assert_eq!(7, arch_to_cpu_type("x86").unwrap());
        assert_eq!(18, arch_to_cpu_type("ppc").unwrap());
        assert_eq!(0x1000012, arch_to_cpu_type("powerpc64").unwrap());
        assert_eq!(0x200000c, arch_to_cpu_type("arm64_32").unwrap());
        assert_eq!(u32::MAX, arch_to_cpu_type("any").unwrap());
    }

    #[test]
    fn unknown_arch() {
        match arch_to_cpu_type("VAX") {
            Err(Error::UnknownArch(name)) => assert_eq!("vax", name),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn names_are_canonical() {
        arbtest(|u| {
            let cpu_type: u32 = if u.arbitrary()? {
                *u.choose(&[
                    CPU_TYPE_ANY,
                    CPU_TYPE_X86,
                    CPU_TYPE_X86_64,
                    CPU_TYPE_HPPA,
                    CPU_TYPE_ARM,
                    CPU_TYPE_ARM64,
                    CPU_TYPE_ARM64_32,
                    CPU_TYPE_SPARC,
                    CPU_TYPE_POWERPC,
                    CPU_TYPE_POWERPC64,
                ])?
            } else {
                u.arbitrary()?
            };
            if let Some(arch) = cpu_type_to_arch(cpu_type) {
                assert_eq!(cpu_type, arch_to_cpu_type(arch).unwrap());
            }
            Ok(())
        });
    }

    #[test]
    fn display() {
        assert_eq!("arm64", CpuId::new(CPU_TYPE_ARM64, 0).to_string());
        assert_eq!(
            "cputype 0x63 subtype 0x2",
            CpuId::new(99, 2).to_string()
        );
    }

    #[test]
    fn abi64() {
        assert!(CpuId::new(CPU_TYPE_X86_64, 3).is_64_bit());
        assert!(!CpuId::new(CPU_TYPE_X86, 3).is_64_bit());
        assert!(!CpuId::new(CPU_TYPE_ANY, 0).is_64_bit());
    }

    #[test]
    fn host_is_64_bit() {
        assert!(CpuId::new(HOST_CPU_TYPE, 0).is_64_bit());
    }
}
