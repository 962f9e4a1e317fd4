//! Command-line parsing and the verb table.

use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// A parsed input line.
///
/// Words are split on spaces. `--word` is a long flag, `-abc` is a group of
/// short flags (each kept once), the first bare word is the executable and
/// the remaining bare words are arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// The raw input line.
    pub line: String,
    pub exec: String,
    pub args: Vec<String>,
    pub short_flags: Vec<char>,
    pub long_flags: Vec<String>,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut cmd = Command {
            line: line.to_string(),
            ..Default::default()
        };

        for word in line.split(' ').filter(|w| !w.is_empty()) {
            if let Some(long) = word.strip_prefix("--") {
                cmd.long_flags.push(long.to_string());
            } else if let Some(short) = word.strip_prefix('-') {
                for flag in short.chars() {
                    if !cmd.short_flags.contains(&flag) {
                        cmd.short_flags.push(flag);
                    }
                }
            } else if cmd.exec.is_empty() {
                cmd.exec = word.to_string();
            } else {
                cmd.args.push(word.to_string());
            }
        }
        cmd
    }

    /// Returns true if the line was blank.
    pub fn is_empty(&self) -> bool {
        self.exec.is_empty()
    }

    /// Returns true if either `-short` or `--long` was given.
    pub fn flag(&self, short: char, long: &str) -> bool {
        self.short_flags.contains(&short) || self.long_flags.iter().any(|f| f == long)
    }

    /// The `index`th argument.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Raw text of the line after the `index`th argument.
    ///
    /// Unlike [`args`](Self::args) nothing is dropped: dash-prefixed words
    /// and runs of spaces are kept. Only the one separating space goes.
    pub fn text_after(&self, index: usize) -> &str {
        let mut bare = 0;
        let mut offset = 0;
        for word in self.line.split(' ') {
            offset += word.len();
            if !word.is_empty() && !word.starts_with('-') {
                // The executable is bare word 0, argument `i` is word `i + 1`.
                if bare == index + 1 {
                    let rest = &self.line[offset..];
                    return rest.strip_prefix(' ').unwrap_or(rest);
                }
                bare += 1;
            }
            offset += 1;
        }
        ""
    }

    /// The verb the executable names, aliases included.
    pub fn verb(&self) -> Option<Verb> {
        Verb::from_str(&self.exec).ok()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

/// Every built-in shell verb.
///
/// Parsing accepts the canonical name and its aliases; display always
/// gives the canonical name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Verb {
    #[strum(to_string = "help", serialize = "man")]
    Help,
    #[strum(to_string = "cls", serialize = "clear")]
    Cls,
    #[strum(to_string = "ls", serialize = "l")]
    Ls,
    #[strum(to_string = "cd")]
    Cd,
    #[strum(to_string = "pwd")]
    Pwd,
    #[strum(to_string = "mkdir")]
    Mkdir,
    #[strum(to_string = "mkfile", serialize = "touch")]
    Mkfile,
    #[strum(to_string = "read", serialize = "cat", serialize = "view")]
    Read,
    #[strum(
        to_string = "write",
        serialize = "edit",
        serialize = "code",
        serialize = "nano",
        serialize = "vim"
    )]
    Write,
    #[strum(to_string = "rm")]
    Rm,
    #[strum(to_string = "mv")]
    Mv,
    #[strum(to_string = "cp")]
    Cp,
    #[strum(to_string = "rename")]
    Rename,
    #[strum(to_string = "df")]
    Df,
    #[strum(to_string = "chkdsk")]
    Chkdsk,
    #[strum(
        to_string = "download",
        serialize = "dl",
        serialize = "wget",
        serialize = "curl"
    )]
    Download,
    #[strum(to_string = "upload")]
    Upload,
    #[strum(to_string = "cache", serialize = "backpack")]
    Cache,
    #[strum(to_string = "timer")]
    Timer,
    #[strum(to_string = "mount")]
    Mount,
    #[strum(to_string = "switch")]
    Switch,
    #[strum(to_string = "unmount", serialize = "umount")]
    Unmount,
    #[strum(to_string = "history")]
    History,
    #[strum(to_string = "save", serialize = "backup")]
    Save,
    #[strum(to_string = "load", serialize = "restart", serialize = "reload")]
    Load,
    #[strum(to_string = "logout", serialize = "quit", serialize = "exit")]
    Logout,
}

impl Verb {
    /// One-line usage string.
    pub fn usage(&self) -> &'static str {
        match self {
            Verb::Help => "help [verb]",
            Verb::Cls => "cls",
            Verb::Ls => "ls [-r|--recursive] [-a|--all] [path]",
            Verb::Cd => "cd [path]",
            Verb::Pwd => "pwd",
            Verb::Mkdir => "mkdir <path>",
            Verb::Mkfile => "mkfile <path>",
            Verb::Read => "read <path>",
            Verb::Write => "write <path> [text...]",
            Verb::Rm => "rm [-r|--recursive] <path>",
            Verb::Mv => "mv <source> <destination>",
            Verb::Cp => "cp <source> <destination>",
            Verb::Rename => "rename <path> <new name>",
            Verb::Df => "df",
            Verb::Chkdsk => "chkdsk [-v|--verbose]",
            Verb::Download => "download <path>",
            Verb::Upload => "upload <name> [directory]",
            Verb::Cache => "cache",
            Verb::Timer => "timer <name> [seconds]",
            Verb::Mount => "mount [name] [capacity]",
            Verb::Switch => "switch [name]",
            Verb::Unmount => "unmount <name>",
            Verb::History => "history",
            Verb::Save => "save [-s|--silent] [-v|--verbose]",
            Verb::Load => "load",
            Verb::Logout => "logout",
        }
    }

    /// Short description for `help`.
    pub fn summary(&self) -> &'static str {
        match self {
            Verb::Help => "list verbs, or show one verb's usage",
            Verb::Cls => "clear the screen",
            Verb::Ls => "list a directory",
            Verb::Cd => "change directory (root when no path)",
            Verb::Pwd => "print the current directory",
            Verb::Mkdir => "create a directory",
            Verb::Mkfile => "create an empty file",
            Verb::Read => "print a file",
            Verb::Write => "replace a file's content, creating it if needed",
            Verb::Rm => "remove a file or directory",
            Verb::Mv => "move or rename",
            Verb::Cp => "copy",
            Verb::Rename => "rename in place",
            Verb::Df => "show space used and available",
            Verb::Chkdsk => "check and repair the filesystem",
            Verb::Download => "move a file into your cache",
            Verb::Upload => "move a cached file into a directory",
            Verb::Cache => "list cached files",
            Verb::Timer => "start or check a countdown",
            Verb::Mount => "mount a new filesystem, or list mounts",
            Verb::Switch => "switch filesystem (home when no name)",
            Verb::Unmount => "unmount a filesystem",
            Verb::History => "show recent commands",
            Verb::Save => "save the filesystem and cache",
            Verb::Load => "reload the last save",
            Verb::Logout => "leave the shell",
        }
    }
}
