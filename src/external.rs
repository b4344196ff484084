//! The process service: spawning external programs and waiting for them.

use crate::command::ExitCode;
use log::debug;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, PipeReader, PipeWriter};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use thiserror::Error;

/// Why a program could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("empty command")]
    EmptyCommand,
    #[error("{0}: command not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where one standard stream of a spawned program is connected.
#[derive(Debug)]
pub enum Endpoint {
    /// The interpreter's own terminal stream.
    Terminal,
    /// The read end of a pipe (standard input only).
    PipeRead(PipeReader),
    /// The write end of a pipe (standard output only).
    PipeWrite(PipeWriter),
}

/// Facility that starts external programs and reports when they finish.
pub trait ProcessService {
    /// Handle to a running program, consumed by [`ProcessService::wait`].
    type Handle;

    /// Start `argv[0]` with the remaining arguments, connecting its standard
    /// input and output to the given endpoints.
    ///
    /// The endpoints are consumed: once this returns, successfully or not, the
    /// caller holds no copy of any pipe end it passed in.
    fn spawn(
        &mut self,
        argv: &[String],
        stdin: Endpoint,
        stdout: Endpoint,
    ) -> Result<Self::Handle, SpawnError>;

    /// Block until the program exits and return its exit code.
    fn wait(&mut self, handle: Self::Handle) -> io::Result<ExitCode>;
}

/// [`ProcessService`] backed by `std::process`.
///
/// Programs are looked up the way [`resolve_program`] describes, using the
/// `PATH` captured at construction.
pub struct OsProcessService {
    search_paths: OsString,
    terminal_output: Option<File>,
}

impl OsProcessService {
    /// Service that resolves programs using the current process `PATH`.
    pub fn from_env() -> Self {
        Self::with_search_paths(std::env::var_os("PATH").unwrap_or_default())
    }

    pub fn with_search_paths(search_paths: impl Into<OsString>) -> Self {
        Self {
            search_paths: search_paths.into(),
            terminal_output: None,
        }
    }

    /// Send the output that would go to the terminal into `file` instead, so
    /// the output of started programs can be inspected.
    #[cfg(test)]
    pub(crate) fn with_terminal_output(mut self, file: File) -> Self {
        self.terminal_output = Some(file);
        self
    }

    fn stdin_stdio(endpoint: Endpoint) -> io::Result<Stdio> {
        match endpoint {
            Endpoint::Terminal => Ok(Stdio::inherit()),
            Endpoint::PipeRead(reader) => Ok(reader.into()),
            Endpoint::PipeWrite(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "write end of a pipe used as standard input",
            )),
        }
    }

    fn stdout_stdio(&self, endpoint: Endpoint) -> io::Result<Stdio> {
        match endpoint {
            Endpoint::Terminal => match &self.terminal_output {
                Some(file) => Ok(file.try_clone()?.into()),
                None => Ok(Stdio::inherit()),
            },
            Endpoint::PipeWrite(writer) => Ok(writer.into()),
            Endpoint::PipeRead(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "read end of a pipe used as standard output",
            )),
        }
    }
}

impl ProcessService for OsProcessService {
    type Handle = Child;

    fn spawn(
        &mut self,
        argv: &[String],
        stdin: Endpoint,
        stdout: Endpoint,
    ) -> Result<Child, SpawnError> {
        let (name, args) = argv.split_first().ok_or(SpawnError::EmptyCommand)?;
        let program = resolve_program(&self.search_paths, Path::new(name))
            .ok_or_else(|| SpawnError::NotFound(name.clone()))?;

        // Pipe ends are close-on-exec, so each child only keeps the end that was
        // dup'ed onto its standard stream. The parent's copies are dropped together
        // with the `Command` at the end of this statement.
        let child = Command::new(&*program)
            .args(args)
            .stdin(Self::stdin_stdio(stdin)?)
            .stdout(self.stdout_stdio(stdout)?)
            .spawn()?;

        debug!("spawned {} as pid {}", program.display(), child.id());
        Ok(child)
    }

    fn wait(&mut self, mut child: Child) -> io::Result<ExitCode> {
        let pid = child.id();
        let exit_status = child.wait()?;
        let code = exit_code(exit_status);
        debug!("pid {pid} exited with {code}");
        Ok(code)
    }
}

/// Exit code of a finished child; signal deaths become `128 + signal`.
fn exit_code(status: ExitStatus) -> ExitCode {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Locate the program that `name` refers to.
///
/// A name with more than one path component (`/bin/ls`, `./run`, `bin/tool`)
/// is used as written, relative to the working directory. A bare name is looked
/// up in each directory of `search_paths` in order. Either way only executable
/// regular files qualify, so a stray data file earlier on the search path does
/// not hide the real program.
pub fn resolve_program<'a>(search_paths: &OsStr, name: &'a Path) -> Option<Cow<'a, Path>> {
    let mut components = name.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(_), Some(_)) => is_executable(name).then_some(Cow::Borrowed(name)),
        (Some(_), None) => std::env::split_paths(search_paths)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
            .map(Cow::Owned),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("pipesh_external_{}_{}_{}", tag, std::process::id(), nanos))
    }

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_path() {
        let path = Path::new("/bin/sh");
        let found = resolve_program(OsStr::new("/nowhere"), path);
        assert_eq!(found.as_deref(), Some(path));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting_path() {
        let found = resolve_program(OsStr::new("/bin"), Path::new("/bin/nonexisting"));
        assert!(found.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let found = resolve_program(OsStr::new("/nowhere:/bin"), Path::new("sh"))
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found.as_ref(), Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let found = resolve_program(OsStr::new("/bin"), Path::new("nonexisting"));
        assert!(found.is_none());
    }

    #[test]
    fn empty_path_is_none() {
        assert!(resolve_program(OsStr::new("/bin"), Path::new("")).is_none());
    }

    #[test]
    fn spawn_rejects_empty_argv() {
        let mut service = OsProcessService::from_env();
        let res = service.spawn(&[], Endpoint::Terminal, Endpoint::Terminal);
        assert!(matches!(res, Err(SpawnError::EmptyCommand)));
    }

    #[test]
    fn spawn_reports_unknown_program() {
        let mut service = OsProcessService::from_env();
        let res = service.spawn(
            &argv(&["pipesh_no_such_program_here"]),
            Endpoint::Terminal,
            Endpoint::Terminal,
        );
        match res {
            Err(SpawnError::NotFound(name)) => assert_eq!(name, "pipesh_no_such_program_here"),
            other => panic!("unexpected spawn result: {:?}", other.map(|c| c.id())),
        }
    }

    #[test]
    #[cfg(unix)]
    fn wait_returns_exit_code() {
        let mut service = OsProcessService::from_env();
        let child = service
            .spawn(&argv(&["sh", "-c", "exit 3"]), Endpoint::Terminal, Endpoint::Terminal)
            .unwrap();
        assert_eq!(service.wait(child).unwrap(), 3);
    }

    #[test]
    #[cfg(unix)]
    fn wait_maps_signals() {
        let mut service = OsProcessService::from_env();
        let child = service
            .spawn(&argv(&["sh", "-c", "kill -9 $$"]), Endpoint::Terminal, Endpoint::Terminal)
            .unwrap();
        assert_eq!(service.wait(child).unwrap(), 128 + 9);
    }

    #[test]
    #[cfg(unix)]
    fn terminal_output_can_be_redirected() {
        let path = temp_file("out");
        let file = File::create(&path).unwrap();
        let mut service = OsProcessService::from_env().with_terminal_output(file);

        let child = service
            .spawn(&argv(&["echo", "hello", "world"]), Endpoint::Terminal, Endpoint::Terminal)
            .unwrap();
        assert_eq!(service.wait(child).unwrap(), 0);

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world\n");
        let _ = fs::remove_file(path);
    }

    /// Create a directory holding `echo` as a plain, non-executable file.
    #[cfg(unix)]
    fn dir_with_data_file_named_echo() -> PathBuf {
        let dir = temp_file("shadow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("echo"), "not a program\n").unwrap();
        dir
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_file_is_skipped_during_lookup() {
        let dir = dir_with_data_file_named_echo();
        let search = std::env::join_paths([dir.as_path(), Path::new("/bin"), Path::new("/usr/bin")]).unwrap();

        let found = resolve_program(&search, Path::new("echo")).expect("echo should be found");
        assert_ne!(found.as_ref(), dir.join("echo").as_path());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[cfg(unix)]
    fn shadowed_program_still_runs() {
        let dir = dir_with_data_file_named_echo();
        let search = std::env::join_paths([dir.as_path(), Path::new("/bin"), Path::new("/usr/bin")]).unwrap();
        let out = temp_file("shadow_out");
        let mut service = OsProcessService::with_search_paths(search)
            .with_terminal_output(File::create(&out).unwrap());

        let child = service
            .spawn(&argv(&["echo", "x"]), Endpoint::Terminal, Endpoint::Terminal)
            .expect("the executable echo later on the path should run");
        assert_eq!(service.wait(child).unwrap(), 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "x\n");

        let _ = fs::remove_file(out);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[cfg(unix)]
    fn explicit_path_to_data_file_is_not_a_program() {
        let dir = dir_with_data_file_named_echo();
        let path = dir.join("echo");
        assert!(resolve_program(OsStr::new("/bin"), &path).is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[cfg(unix)]
    fn pipe_end_in_wrong_direction_is_refused() {
        let (reader, _writer) = std::io::pipe().unwrap();
        let mut service = OsProcessService::from_env();
        let res = service.spawn(&argv(&["cat"]), Endpoint::Terminal, Endpoint::PipeRead(reader));
        assert!(matches!(res, Err(SpawnError::Io(_))));
    }
}
