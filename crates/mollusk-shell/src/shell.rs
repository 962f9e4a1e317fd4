//! The interactive shell.
//!
//! [`Shell`] owns a session: the player, their home host, their cache and
//! their timers. [`Shell::execute`] runs one input line and writes whatever
//! the player should see. Verb failures are reported as `ERROR:` lines and
//! never end the session.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;

use mollusk_fs::{Cache, FileSystem, FsError, Host, Kind, Tree};
use strum::IntoEnumIterator;

use crate::command::{Command, Verb};
use crate::config::ShellConfig;
use crate::persist::{self, PersistError};
use crate::timer::{TimerError, TimerStatus, Timers};

/// Errors a verb can report to the player.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("cannot {action}: away from home '{home}'")]
    AwayFromHome { action: &'static str, home: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

type ShellResult<T = ()> = Result<T, ShellError>;

/// One player's session.
#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
    user: String,
    host: Host,
    cache: Cache,
    timers: Timers,
    history: VecDeque<String>,
    running: bool,
}

impl Shell {
    /// Start a session on an existing filesystem and cache.
    pub fn new(config: ShellConfig, home: FileSystem, cache: Cache) -> Self {
        Self {
            user: config.user.clone(),
            host: Host::new(config.host.clone(), home),
            cache,
            timers: Timers::new(),
            history: VecDeque::new(),
            running: true,
            config,
        }
    }

    /// Start a session from the saved state the config points at.
    pub fn load(config: ShellConfig) -> Self {
        let home =
            persist::load_fs_or_default(&config.state_path, &config.root_name, config.capacity);
        let cache = persist::load_cache_or_default(&config.cache_path, config.cache_slots);
        Self::new(config, home, cache)
    }

    /// Replace the timer set, e.g. with a faster tick.
    pub fn with_timers(mut self, timers: Timers) -> Self {
        self.timers = timers;
        self
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// The filesystem verbs currently act on.
    pub fn fs(&self) -> &FileSystem {
        self.host.fs()
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// False once the player has logged out.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `user@host:path$ `
    pub fn prompt(&self) -> String {
        format!(
            "{}@{}:{}$ ",
            self.user,
            self.host.name(),
            self.host.fs().cwd_path()
        )
    }

    /// Announce timers that ran out since the last call.
    pub fn notify_timers(&self, out: &mut impl Write) -> io::Result<()> {
        for name in self.timers.drain_expired() {
            writeln!(out, "{name}: Time's up!")?;
        }
        Ok(())
    }

    /// Run one input line.
    ///
    /// Only failures writing to `out` are returned; everything else is
    /// reported to the player.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> io::Result<()> {
        let cmd = Command::parse(line);
        if cmd.is_empty() {
            return Ok(());
        }
        self.remember(line);
        tracing::debug!(exec = %cmd.exec, args = ?cmd.args, "execute");

        match self.dispatch(&cmd, out) {
            Ok(()) => Ok(()),
            Err(ShellError::Io(e)) => Err(e),
            Err(e) => {
                tracing::debug!(command = %cmd, "command failed: {e}");
                writeln!(out, "ERROR: {e}")
            }
        }
    }

    /// Read-eval loop: prompt, read a line from `input`, run it.
    ///
    /// Stops at logout or end of input. A line that is not valid UTF-8 is
    /// reported and skipped. Only read and write failures on the streams
    /// themselves are returned; callers should still [`shutdown`](Self::shutdown)
    /// afterwards.
    pub fn run(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<()> {
        let mut buf = Vec::new();
        while self.running {
            self.notify_timers(out)?;
            write!(out, "{}", self.prompt())?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                break;
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => self.execute(line, out)?,
                Err(e) => {
                    tracing::debug!("skipping undecodable input: {e}");
                    writeln!(out, "ERROR: input is not valid UTF-8")?;
                }
            }
        }
        Ok(())
    }

    /// Save state at the end of a session, going home first if needed.
    pub fn shutdown(&mut self) -> Result<(), PersistError> {
        self.host.go_home();
        self.save_state()
    }

    fn remember(&mut self, line: &str) {
        if self.config.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.config.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(line.trim().to_string());
    }

    fn save_state(&self) -> Result<(), PersistError> {
        persist::save_fs(self.host.home(), &self.config.state_path)?;
        persist::save_cache(&self.cache, &self.config.cache_path)
    }

    fn require_home(&self, action: &'static str) -> ShellResult {
        if self.host.is_home() {
            Ok(())
        } else {
            Err(ShellError::AwayFromHome {
                action,
                home: self.host.home().name().to_string(),
            })
        }
    }

    fn dispatch(&mut self, cmd: &Command, out: &mut impl Write) -> ShellResult {
        let Some(verb) = cmd.verb() else {
            return Err(ShellError::UnknownCommand(cmd.exec.clone()));
        };
        let arg = |index: usize| cmd.arg(index).ok_or(ShellError::Usage(verb.usage()));

        match verb {
            Verb::Help => self.help(cmd.arg(0), out),
            Verb::Cls => Ok(write!(out, "\x1b[2J\x1b[H")?),
            Verb::Ls => {
                let recursive = cmd.flag('r', "recursive");
                let all = cmd.flag('a', "all");
                let entries = self.host.fs().ls(cmd.arg(0).unwrap_or(""), recursive, all)?;
                for entry in entries {
                    let indent = "  ".repeat(entry.depth);
                    let suffix = if entry.kind == Kind::Dir { "/" } else { "" };
                    writeln!(out, "{indent}{}{suffix}", entry.name)?;
                }
                Ok(())
            }
            Verb::Cd => {
                let root = self.host.fs().name().to_string();
                self.host.fs_mut().cd(cmd.arg(0).unwrap_or(&root))?;
                Ok(())
            }
            Verb::Pwd => Ok(writeln!(out, "{}", self.host.fs().cwd_path())?),
            Verb::Mkdir => {
                self.host.fs_mut().mkdir(arg(0)?)?;
                Ok(())
            }
            Verb::Mkfile => {
                self.host.fs_mut().mkfile(arg(0)?)?;
                Ok(())
            }
            Verb::Read => Ok(writeln!(out, "{}", self.host.fs().read(arg(0)?)?)?),
            Verb::Write => {
                let path = arg(0)?;
                self.host.fs_mut().write(path, cmd.text_after(0))?;
                Ok(())
            }
            Verb::Rm => {
                self.host.fs_mut().rm(arg(0)?, cmd.flag('r', "recursive"))?;
                Ok(())
            }
            Verb::Mv => {
                self.host.fs_mut().mv(arg(0)?, arg(1)?)?;
                Ok(())
            }
            Verb::Cp => {
                self.host.fs_mut().cp(arg(0)?, arg(1)?)?;
                Ok(())
            }
            Verb::Rename => {
                self.host.fs_mut().rename(arg(0)?, arg(1)?)?;
                Ok(())
            }
            Verb::Df => self.df(out),
            Verb::Chkdsk => self.chkdsk(cmd.flag('v', "verbose"), out),
            Verb::Download => {
                let file = self.cache.download(self.host.fs_mut(), arg(0)?)?;
                writeln!(out, "Downloaded {} to cache.", file.name)?;
                Ok(())
            }
            Verb::Upload => {
                let name = arg(0)?;
                self.cache
                    .upload(self.host.fs_mut(), name, cmd.arg(1).unwrap_or(""))?;
                writeln!(out, "Uploaded {name}.")?;
                Ok(())
            }
            Verb::Cache => self.show_cache(out),
            Verb::Timer => self.timer(arg(0)?, cmd.arg(1), out),
            Verb::Mount => self.mount(cmd.arg(0), cmd.arg(1), out),
            Verb::Switch => {
                self.host.switch(cmd.arg(0))?;
                Ok(())
            }
            Verb::Unmount => {
                self.host.unmount(arg(0)?)?;
                Ok(())
            }
            Verb::History => {
                for (index, line) in self.history.iter().enumerate() {
                    writeln!(out, "{:>3}  {line}", index + 1)?;
                }
                Ok(())
            }
            Verb::Save => self.save(cmd.flag('s', "silent"), cmd.flag('v', "verbose"), out),
            Verb::Load => self.reload(out),
            Verb::Logout => {
                self.require_home("logout")?;
                self.running = false;
                Ok(())
            }
        }
    }

    fn help(&self, topic: Option<&str>, out: &mut impl Write) -> ShellResult {
        if let Some(topic) = topic {
            let verb: Verb = topic
                .parse()
                .map_err(|_| ShellError::UnknownCommand(topic.to_string()))?;
            writeln!(out, "{}", verb.usage())?;
            writeln!(out, "  {}", verb.summary())?;
            return Ok(());
        }
        for verb in Verb::iter() {
            writeln!(out, "{:<10} {}", verb.to_string(), verb.summary())?;
        }
        Ok(())
    }

    fn df(&self, out: &mut impl Write) -> ShellResult {
        let fs = self.host.fs();
        let usage = fs.usage();
        match usage.capacity {
            Some(capacity) => writeln!(
                out,
                "{}: {}/{} bytes used, {} free",
                fs.name(),
                usage.used,
                capacity,
                usage.available().unwrap_or_default()
            )?,
            None => writeln!(out, "{}: {} bytes used, unbounded", fs.name(), usage.used)?,
        }
        Ok(())
    }

    fn chkdsk(&mut self, verbose: bool, out: &mut impl Write) -> ShellResult {
        let report = self.host.fs_mut().validate();
        if !report.repaired() {
            writeln!(out, "No problems found.")?;
            return Ok(());
        }
        tracing::info!(repairs = report.repairs.len(), "chkdsk repaired filesystem");
        writeln!(out, "Repaired {} problem(s).", report.repairs.len())?;
        if verbose {
            for repair in &report.repairs {
                writeln!(out, "  {repair}")?;
            }
        }
        Ok(())
    }

    fn show_cache(&self, out: &mut impl Write) -> ShellResult {
        writeln!(out, "Cache ({}/{}):", self.cache.len(), self.cache.slots())?;
        if self.cache.is_empty() {
            writeln!(out, "Cache is empty. To store files, do")?;
            writeln!(out, "  download path/to/file.ext")?;
            return Ok(());
        }
        for (index, file) in self.cache.files().iter().enumerate() {
            writeln!(out, "[{index}]  {}", file.name)?;
        }
        Ok(())
    }

    fn timer(&self, name: &str, seconds: Option<&str>, out: &mut impl Write) -> ShellResult {
        let Some(seconds) = seconds else {
            match self.timers.check(name)? {
                TimerStatus::Running(left) => writeln!(out, "{name}: {left} s")?,
                TimerStatus::Expired => writeln!(out, "{name}: done")?,
            }
            return Ok(());
        };
        let seconds: u64 = seconds
            .parse()
            .map_err(|_| ShellError::Usage(Verb::Timer.usage()))?;
        self.timers.start(name, seconds)?;
        writeln!(out, "{name}: started ({seconds} s)")?;
        Ok(())
    }

    fn mount(&mut self, name: Option<&str>, capacity: Option<&str>, out: &mut impl Write) -> ShellResult {
        let Some(name) = name else {
            for mounted in self.host.mounts() {
                let marker = if mounted == self.host.fs().name() { "*" } else { " " };
                writeln!(out, "{marker} {mounted}")?;
            }
            return Ok(());
        };
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(FsError::invalid_name(name).into());
        }
        let capacity = capacity
            .map(|c| c.parse::<usize>())
            .transpose()
            .map_err(|_| ShellError::Usage(Verb::Mount.usage()))?;
        self.host.mount(FileSystem::from_tree(Tree::new(name, capacity)))?;
        writeln!(out, "Mounted {name}.")?;
        Ok(())
    }

    fn save(&self, silent: bool, verbose: bool, out: &mut impl Write) -> ShellResult {
        self.require_home("save")?;
        self.save_state()?;
        if silent {
            return Ok(());
        }
        writeln!(out, "Successfully saved filesystem!")?;
        if verbose {
            for (index, record) in mollusk_fs::to_records(self.host.home().tree())
                .iter()
                .enumerate()
            {
                writeln!(
                    out,
                    "  [{index}] {} ({}, parent {})",
                    record.name,
                    record.kind(),
                    record.parent
                )?;
            }
        }
        Ok(())
    }

    fn reload(&mut self, out: &mut impl Write) -> ShellResult {
        self.require_home("load")?;
        let home = persist::load_fs(&self.config.state_path)?;
        let cache = persist::load_cache(&self.config.cache_path, self.config.cache_slots)?;
        self.host.replace_home(home);
        self.cache = cache;
        writeln!(out, "Loaded last save.")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(ShellConfig::default(), FileSystem::default(), Cache::new(2))
    }

    fn run(shell: &mut Shell, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prompt() {
        let mut shell = shell();
        assert_eq!(shell.prompt(), "guest@localhost:~$ ");
        run(&mut shell, "mkdir docs");
        run(&mut shell, "cd docs");
        assert_eq!(shell.prompt(), "guest@localhost:~/docs$ ");
        run(&mut shell, "cd");
        assert_eq!(shell.prompt(), "guest@localhost:~$ ");
    }

    #[test]
    fn test_write_and_read() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "nano hello.txt hi there"), "");
        assert_eq!(run(&mut shell, "cat hello.txt"), "hi there\n");
    }

    #[test]
    fn test_write_keeps_text_verbatim() {
        let mut shell = shell();
        run(&mut shell, "write temp.txt it is -5  degrees");
        assert_eq!(run(&mut shell, "cat temp.txt"), "it is -5  degrees\n");
    }

    #[test]
    fn test_ls_output() {
        let mut shell = shell();
        run(&mut shell, "mkdir docs");
        run(&mut shell, "touch docs/a");
        run(&mut shell, "touch .hidden");
        assert_eq!(run(&mut shell, "ls"), "docs/\n");
        assert_eq!(run(&mut shell, "ls -ra"), ".hidden\ndocs/\n  a\n");
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let mut shell = shell();
        assert_eq!(
            run(&mut shell, "read nope"),
            "ERROR: not found: 'nope' in 'nope'\n"
        );
        assert_eq!(run(&mut shell, "mkdir"), "ERROR: usage: mkdir <path>\n");
        assert!(run(&mut shell, "frobnicate").starts_with("ERROR: unknown command"));
        assert!(shell.is_running());
    }

    #[test]
    fn test_rm_flags() {
        let mut shell = shell();
        run(&mut shell, "mkdir docs");
        run(&mut shell, "touch docs/a");
        assert!(run(&mut shell, "rm docs").starts_with("ERROR: directory not empty"));
        assert_eq!(run(&mut shell, "rm --recursive docs"), "");
        assert_eq!(run(&mut shell, "ls"), "");
    }

    #[test]
    fn test_download_and_upload() {
        let mut shell = shell();
        run(&mut shell, "write loot gold");
        assert_eq!(run(&mut shell, "wget loot"), "Downloaded loot to cache.\n");
        assert_eq!(shell.cache().len(), 1);
        assert_eq!(run(&mut shell, "cache"), "Cache (1/2):\n[0]  loot\n");

        run(&mut shell, "mkdir vault");
        assert_eq!(run(&mut shell, "upload loot vault"), "Uploaded loot.\n");
        assert_eq!(run(&mut shell, "read vault/loot"), "gold\n");
        assert!(shell.cache().is_empty());
    }

    #[test]
    fn test_mount_switch_and_home_only_verbs() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "mount usb 16"), "Mounted usb.\n");
        run(&mut shell, "switch usb");
        assert_eq!(shell.prompt(), "guest@localhost:usb$ ");
        assert_eq!(run(&mut shell, "mount"), "  ~\n* usb\n");

        assert!(run(&mut shell, "save").starts_with("ERROR: cannot save: away from home"));
        assert!(run(&mut shell, "load").starts_with("ERROR: cannot load"));
        assert!(run(&mut shell, "logout").starts_with("ERROR: cannot logout"));
        assert!(shell.is_running());

        run(&mut shell, "switch");
        assert!(shell.host().is_home());
        assert!(run(&mut shell, "unmount ~").starts_with("ERROR: invalid target"));
        assert_eq!(run(&mut shell, "unmount usb"), "");
        assert_eq!(run(&mut shell, "exit"), "");
        assert!(!shell.is_running());
    }

    #[test]
    fn test_df() {
        let mut shell = Shell::new(
            ShellConfig::default(),
            FileSystem::new("~", Some(10)),
            Cache::default(),
        );
        run(&mut shell, "write a 1234");
        assert_eq!(run(&mut shell, "df"), "~: 4/10 bytes used, 6 free\n");
        assert!(run(&mut shell, "write b 1234567").starts_with("ERROR: capacity exceeded"));
    }

    #[test]
    fn test_history_is_bounded() {
        let config = ShellConfig {
            history_limit: 2,
            ..ShellConfig::default()
        };
        let mut shell = Shell::new(config, FileSystem::default(), Cache::default());
        run(&mut shell, "pwd");
        run(&mut shell, "  ");
        run(&mut shell, "ls");
        run(&mut shell, "df");
        assert_eq!(shell.history().collect::<Vec<_>>(), vec!["ls", "df"]);
    }

    #[test]
    fn test_help() {
        let mut shell = shell();
        assert_eq!(
            run(&mut shell, "man rm"),
            "rm [-r|--recursive] <path>\n  remove a file or directory\n"
        );
        assert!(run(&mut shell, "help").lines().count() >= 20);
    }

    #[test]
    fn test_chkdsk_clean() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "chkdsk -v"), "No problems found.\n");
    }
}
