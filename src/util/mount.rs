use anyhow::{Context, Result};
use nix::mount::MsFlags;
use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub fn mount(
    source: Option<&Path>,
    target: &Path,
    fstype: Option<&str>,
    flags: MsFlags,
    data: Option<&str>,
) -> Result<()> {
    let source_cstr = match source {
        Some(source) => CString::new(source.as_os_str().as_bytes())?,
        None => CString::new("")?,
    };
    let target_cstr = CString::new(target.as_os_str().as_bytes())?;
    let fstype_cstr = CString::new(fstype.unwrap_or(""))?;
    let data_cstr = CString::new(data.unwrap_or(""))?;

    let result = nix::mount::mount::<CStr, CStr, CStr, CStr>(
        source.map(|_| source_cstr.as_c_str()),
        target_cstr.as_c_str(),
        fstype.map(|_| fstype_cstr.as_c_str()),
        flags,
        data.map(|_| data_cstr.as_c_str()),
    );

    result
        .map_err(std::io::Error::from)
        .with_context(|| {
            format!(
                "failed to mount {} {} [type={}, flags={}, data={}]",
                source_cstr.to_string_lossy(),
                target_cstr.to_string_lossy(),
                fstype_cstr.to_string_lossy(),
                describe_flags(flags),
                data_cstr.to_string_lossy(),
            )
        })
}

/// Renders mount flags the way mount(8) users read them, e.g. `bind,rec`.
pub fn describe_flags(flags: MsFlags) -> String {
    const NAMES: [(MsFlags, &str); 6] = [
        (MsFlags::MS_BIND, "bind"),
        (MsFlags::MS_REC, "rec"),
        (MsFlags::MS_PRIVATE, "private"),
        (MsFlags::MS_SLAVE, "slave"),
        (MsFlags::MS_RDONLY, "ro"),
        (MsFlags::MS_REMOUNT, "remount"),
    ];

    let names: Vec<&str> = NAMES
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect();

    if names.is_empty() {
        format!("{:#x}", flags.bits())
    } else {
        names.join(",")
    }
}
