#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Modules reported by the fake tool, as OSLOM writes them.
pub const TWO_MODULES: &str = "#module 0 size: 2 bs: 0.012\n1 2\n#module 1 size: 2 bs: 0.034\n2 3\n";

/// Install a stand-in for an OSLOM executable under `bin_dir`.
///
/// The script records its arguments in `args.txt` and a copy of its input
/// in `input.dat` next to itself, runs `extra` (any shell), then writes
/// `modules` as the `tp` result file unless `modules` is `None`.
pub fn fake_oslom(bin_dir: &Path, name: &str, modules: Option<&str>, extra: &str) -> PathBuf {
    fs::create_dir_all(bin_dir).unwrap();
    let record = bin_dir.display();
    let write_modules = match modules {
        Some(text) => format!(
            "mkdir -p \"${{input}}_oslo_files\"\nprintf '%s' '{}' > \"${{input}}_oslo_files/tp\"\n",
            text
        ),
        None => String::new(),
    };
    let script = format!(
        "#!/bin/sh\n\
         printf '%s\\n' \"$@\" > '{record}/args.txt'\n\
         while [ $# -gt 0 ]; do\n\
         \x20 case \"$1\" in\n\
         \x20   -f) input=\"$2\"; shift ;;\n\
         \x20 esac\n\
         \x20 shift\n\
         done\n\
         cp \"$input\" '{record}/input.dat'\n\
         pwd > '{record}/cwd.txt'\n\
         {extra}\n\
         {write_modules}"
    );
    let path = bin_dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Arguments the fake tool was last called with, one per entry.
pub fn recorded_args(bin_dir: &Path) -> Vec<String> {
    fs::read_to_string(bin_dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn recorded_input(bin_dir: &Path) -> String {
    fs::read_to_string(bin_dir.join("input.dat")).unwrap()
}

pub fn recorded_cwd(bin_dir: &Path) -> PathBuf {
    PathBuf::from(fs::read_to_string(bin_dir.join("cwd.txt")).unwrap().trim())
}
