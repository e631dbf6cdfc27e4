use crate::codec::TextCodec;
use crate::errors::DeskError;
use crate::record_store::{Record, RecordStore};
use crate::runtime::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads every decodable record from `path`. A missing file is an empty
/// store; lines that fail to decode, including lines that are not UTF-8,
/// are dropped without a trace.
pub fn load<R: TextCodec>(fs: &dyn FileSystem, path: &Path) -> Result<Vec<R>, DeskError> {
    if !fs.exists(path) {
        return Ok(Vec::new());
    }
    let contents = fs.read_bytes(path)?;
    Ok(contents
        .split(|byte| *byte == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(R::decode)
        .collect())
}

/// Overwrites `path` with one encoded line per record. Not atomic: a failure
/// part-way through can leave a truncated file behind.
pub fn save<R: TextCodec>(fs: &dyn FileSystem, path: &Path, records: &[R]) -> Result<(), DeskError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    let mut contents = String::new();
    for record in records {
        contents.push_str(&record.encode());
        contents.push('\n');
    }
    fs.write_string(path, &contents)
}

/// A record store bound to its backing file: loaded once when a session
/// opens, written back in full when it closes.
pub struct RecordFile<R> {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    pub store: RecordStore<R>,
}

impl<R: Record + TextCodec> RecordFile<R> {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            store: RecordStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory store with the file contents. On failure the
    /// store is left as it was.
    pub fn load(&mut self) -> Result<usize, DeskError> {
        let records = load::<R>(self.fs.as_ref(), &self.path)?;
        let count = records.len();
        self.store = RecordStore::from_records(records);
        Ok(count)
    }

    pub fn save(&self) -> Result<usize, DeskError> {
        save(self.fs.as_ref(), &self.path, self.store.list())?;
        Ok(self.store.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{load, save};
    use crate::errors::DeskError;
    use crate::runtime::{FakeFileSystem, FileSystem, ProductionFileSystem};
    use crate::students::Student;
    use std::path::Path;

    #[test]
    fn missing_file_loads_as_empty() {
        let fs = FakeFileSystem::default();
        let loaded: Vec<Student> = load(&fs, Path::new("/nope/students.txt")).expect("load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let fs = FakeFileSystem::with_file(
            "/data/students.txt",
            "Alice,1,A\nBob,notanumber,B\n\nCara,3\nDan,4,C,extra\nEve,5,B\n",
        );
        let loaded: Vec<Student> = load(&fs, Path::new("/data/students.txt")).expect("load");
        assert_eq!(
            loaded,
            vec![Student::new("Alice", 1, "A"), Student::new("Eve", 5, "B")]
        );
    }

    #[test]
    fn non_utf8_line_is_skipped_and_the_rest_survive_a_save() {
        let path = Path::new("/data/students.txt");
        let fs = FakeFileSystem::with_bytes(path, b"Alice,1,A\nBob,2,B\nJos\xe9,3,C\n".to_vec());
        let loaded: Vec<Student> = load(&fs, path).expect("load");
        assert_eq!(
            loaded,
            vec![Student::new("Alice", 1, "A"), Student::new("Bob", 2, "B")]
        );

        save(&fs, path, &loaded).expect("save");
        assert_eq!(fs.read_to_string(path).expect("read"), "Alice,1,A\nBob,2,B\n");
    }

    #[test]
    fn crlf_and_whitespace_only_lines() {
        let fs = FakeFileSystem::with_file(
            "/data/students.txt",
            "Alice,1,A\r\n   \r\n\t\nBob,-2,B\r\n",
        );
        let loaded: Vec<Student> = load(&fs, Path::new("/data/students.txt")).expect("load");
        assert_eq!(
            loaded,
            vec![Student::new("Alice", 1, "A"), Student::new("Bob", -2, "B")]
        );
    }

    #[test]
    fn read_failure_surfaces_as_io_error() {
        let fs = FakeFileSystem::with_file("/data/students.txt", "Alice,1,A\n");
        fs.set_fail_next(DeskError::Io("disk gone".to_string()));
        let err = load::<Student>(&fs, Path::new("/data/students.txt")).expect_err("io");
        assert!(matches!(err, DeskError::Io(_)));
    }

    #[test]
    fn save_rewrites_whole_file_in_order() {
        let fs = FakeFileSystem::with_file("/data/students.txt", "Old,9,F\n");
        let records = vec![Student::new("Bob", 2, "B"), Student::new("Alice", 1, "A")];
        save(&fs, Path::new("/data/students.txt"), &records).expect("save");
        let text = fs
            .read_to_string(Path::new("/data/students.txt"))
            .expect("read");
        assert_eq!(text, "Bob,2,B\nAlice,1,A\n");
        assert_eq!(fs.created_dirs(), vec![Path::new("/data").to_path_buf()]);
    }

    #[test]
    fn save_then_load_round_trips_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("students.txt");
        let records = vec![
            Student::new("Alice", 1, "A"),
            Student::new("Bob", 2, "B"),
            Student::new("Alice", 1, "A"),
        ];
        save(&ProductionFileSystem, &path, &records).expect("save");
        let loaded: Vec<Student> = load(&ProductionFileSystem, &path).expect("load");
        assert_eq!(loaded, records);
    }
}
