//! Executable-format inspection of downloaded artifacts.
//!
//! A correct digest only proves the bytes are the ones the table names. A
//! table row pointing at the wrong build would still verify, so the header
//! is checked against the target platform as well.

use goblin::Object;
use goblin::mach::Mach;
use log::debug;
use std::fmt;

use crate::platform::{Arch, Os, PlatformKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Elf,
    MachO,
    Pe,
}

impl BinaryFormat {
    pub fn expected_for(os: Os) -> Self {
        match os {
            Os::Linux | Os::FreeBsd => BinaryFormat::Elf,
            Os::Macos => BinaryFormat::MachO,
            Os::Windows => BinaryFormat::Pe,
        }
    }
}

impl fmt::Display for BinaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryFormat::Elf => f.write_str("ELF"),
            BinaryFormat::MachO => f.write_str("Mach-O"),
            BinaryFormat::Pe => f.write_str("PE"),
        }
    }
}

/// Format and CPU architectures found in an executable header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableInfo {
    pub format: BinaryFormat,
    /// Empty when the header names a CPU this installer does not know.
    /// Universal Mach-O binaries list every slice.
    pub arches: Vec<Arch>,
}

/// Parse the executable header of `data`. `None` if it is not a native executable.
pub fn inspect(data: &[u8]) -> Option<ExecutableInfo> {
    match Object::parse(data) {
        Ok(Object::Elf(elf)) => Some(ExecutableInfo {
            format: BinaryFormat::Elf,
            arches: elf_arch(elf.header.e_machine).into_iter().collect(),
        }),
        Ok(Object::Mach(Mach::Binary(macho))) => Some(ExecutableInfo {
            format: BinaryFormat::MachO,
            arches: mach_arch(macho.header.cputype).into_iter().collect(),
        }),
        Ok(Object::Mach(Mach::Fat(multi))) => Some(ExecutableInfo {
            format: BinaryFormat::MachO,
            arches: multi
                .iter_arches()
                .filter_map(|arch| arch.ok())
                .filter_map(|arch| mach_arch(arch.cputype))
                .collect(),
        }),
        Ok(Object::PE(pe)) => Some(ExecutableInfo {
            format: BinaryFormat::Pe,
            arches: pe_arch(pe.header.coff_header.machine).into_iter().collect(),
        }),
        Ok(_) => None,
        Err(e) => {
            debug!("Not a parseable executable: {}", e);
            None
        }
    }
}

/// Describe why `data` cannot run on `key`, if its header says so.
/// Data that is not a recognizable executable (scripts, unknown formats) passes.
pub fn platform_mismatch(data: &[u8], key: PlatformKey) -> Option<String> {
    let info = inspect(data)?;
    let expected = BinaryFormat::expected_for(key.os);

    if info.format != expected {
        return Some(format!(
            "artifact is a {} executable, {} expects {}",
            info.format, key, expected
        ));
    }
    if !info.arches.is_empty() && !info.arches.contains(&key.arch) {
        let found = info
            .arches
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Some(format!(
            "artifact is built for {}, {} expects {}",
            found, key, key.arch
        ));
    }
    None
}

fn elf_arch(machine: u16) -> Option<Arch> {
    use goblin::elf::header::{EM_AARCH64, EM_X86_64};
    match machine {
        EM_X86_64 => Some(Arch::Amd64),
        EM_AARCH64 => Some(Arch::Arm64),
        _ => None,
    }
}

fn mach_arch(cputype: u32) -> Option<Arch> {
    use goblin::mach::cputype::{CPU_TYPE_ARM64, CPU_TYPE_X86_64};
    match cputype {
        CPU_TYPE_X86_64 => Some(Arch::Amd64),
        CPU_TYPE_ARM64 => Some(Arch::Arm64),
        _ => None,
    }
}

fn pe_arch(machine: u16) -> Option<Arch> {
    use goblin::pe::header::{COFF_MACHINE_ARM64, COFF_MACHINE_X86_64};
    match machine {
        COFF_MACHINE_X86_64 => Some(Arch::Amd64),
        COFF_MACHINE_ARM64 => Some(Arch::Arm64),
        _ => None,
    }
}
