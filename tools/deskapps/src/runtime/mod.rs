use crate::errors::DeskError;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, DeskError>;
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, DeskError>;
    fn write_string(&self, path: &Path, contents: &str) -> Result<(), DeskError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), DeskError>;
    fn exists(&self, path: &Path) -> bool;
}

pub trait Terminal: Send + Sync {
    fn stdin_is_tty(&self) -> bool;
    fn write_line(&self, line: &str) -> Result<(), DeskError>;
    /// `Ok(None)` once input is exhausted. A line that is not UTF-8 is
    /// `DeskError::InvalidInput`; the next call reads on past it.
    fn read_line(&self) -> Result<Option<String>, DeskError>;
}

pub struct ProductionClock;

impl Clock for ProductionClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, DeskError> {
        std::fs::read_to_string(path).map_err(|e| DeskError::Io(e.to_string()))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, DeskError> {
        std::fs::read(path).map_err(|e| DeskError::Io(e.to_string()))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), DeskError> {
        std::fs::write(path, contents).map_err(|e| DeskError::Io(e.to_string()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DeskError> {
        std::fs::create_dir_all(path).map_err(|e| DeskError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub const NON_UTF8_INPUT: &str = "Input is not valid UTF-8.";

pub struct ProductionTerminal;

impl Terminal for ProductionTerminal {
    fn stdin_is_tty(&self) -> bool {
        std::io::IsTerminal::is_terminal(&std::io::stdin())
    }

    fn write_line(&self, line: &str) -> Result<(), DeskError> {
        use std::io::Write;
        let mut out = std::io::stdout();
        writeln!(out, "{line}").map_err(|e| DeskError::Io(e.to_string()))
    }

    fn read_line(&self) -> Result<Option<String>, DeskError> {
        use std::io::BufRead;
        let mut buffer = Vec::new();
        let read = std::io::stdin()
            .lock()
            .read_until(b'\n', &mut buffer)
            .map_err(|e| DeskError::Io(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        while buffer.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
            buffer.pop();
        }
        String::from_utf8(buffer)
            .map(Some)
            .map_err(|_| DeskError::InvalidInput(NON_UTF8_INPUT.to_string()))
    }
}

pub struct ProductionRuntime {
    pub clock: Arc<dyn Clock>,
    pub file_system: Arc<dyn FileSystem>,
    pub terminal: Arc<dyn Terminal>,
}

impl ProductionRuntime {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ProductionClock),
            file_system: Arc::new(ProductionFileSystem),
            terminal: Arc::new(ProductionTerminal),
        }
    }
}

impl Default for ProductionRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<SystemTime>>,
}

impl FakeClock {
    pub fn new(now: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().expect("clock lock")
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    dirs: Arc<Mutex<Vec<PathBuf>>>,
    fail_next: Arc<Mutex<Option<DeskError>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self::with_bytes(path, contents.into().into_bytes())
    }

    pub fn with_bytes(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }

    pub fn set_fail_next(&self, error: DeskError) {
        *self.fail_next.lock().expect("fail lock") = Some(error);
    }

    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().expect("dirs lock").clone()
    }

    fn maybe_fail(&self) -> Result<(), DeskError> {
        if let Some(err) = self.fail_next.lock().expect("fail lock").take() {
            return Err(err);
        }
        Ok(())
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, DeskError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| DeskError::Io(e.to_string()))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, DeskError> {
        self.maybe_fail()?;
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| DeskError::Io(format!("missing file {}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), DeskError> {
        self.maybe_fail()?;
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DeskError> {
        self.maybe_fail()?;
        self.dirs
            .lock()
            .expect("dirs lock")
            .push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
    }
}

#[derive(Default, Clone)]
pub struct FakeTerminal {
    pub is_tty: bool,
    input: Arc<Mutex<VecDeque<Result<String, DeskError>>>>,
    writes: Arc<Mutex<Vec<String>>>,
    write_failure: Arc<Mutex<Option<(usize, String)>>>,
}

impl FakeTerminal {
    pub fn new(is_tty: bool) -> Self {
        Self {
            is_tty,
            ..Self::default()
        }
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminal = Self::default();
        terminal
            .input
            .lock()
            .expect("input lock")
            .extend(lines.into_iter().map(|line| Ok(line.into())));
        terminal
    }

    /// Queues a failed read after any input already queued.
    pub fn push_read_error(&self, error: DeskError) {
        self.input.lock().expect("input lock").push_back(Err(error));
    }

    pub fn push_line(&self, line: impl Into<String>) {
        self.input
            .lock()
            .expect("input lock")
            .push_back(Ok(line.into()));
    }

    /// After `successes` more writes, every `write_line` fails with
    /// `DeskError::Io(message)`.
    pub fn fail_writes_after(&self, successes: usize, message: impl Into<String>) {
        *self.write_failure.lock().expect("write failure lock") =
            Some((successes, message.into()));
    }

    pub fn written_lines(&self) -> Vec<String> {
        self.writes.lock().expect("writes lock").clone()
    }
}

impl Terminal for FakeTerminal {
    fn stdin_is_tty(&self) -> bool {
        self.is_tty
    }

    fn write_line(&self, line: &str) -> Result<(), DeskError> {
        if let Some((remaining, message)) =
            self.write_failure.lock().expect("write failure lock").as_mut()
        {
            if *remaining == 0 {
                return Err(DeskError::Io(message.clone()));
            }
            *remaining -= 1;
        }
        self.writes
            .lock()
            .expect("writes lock")
            .push(line.to_string());
        Ok(())
    }

    fn read_line(&self) -> Result<Option<String>, DeskError> {
        self.input
            .lock()
            .expect("input lock")
            .pop_front()
            .transpose()
    }
}
