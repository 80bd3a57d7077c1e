use parking_lot::Mutex;
use quill_core::{
    error::{QuillError, Result},
    observe, AuditEvent, AuditLog, EpochSecs, FileLogConfig, TenantId,
};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

const BACKEND: &str = "file";

/// Append-only JSON-lines audit log
///
/// One serialized [`AuditEvent`] per line. A single mutex serializes appends
/// and queries, so at most one file operation is in flight per instance.
pub struct FileAuditLog {
    config: FileLogConfig,
    writer: Mutex<File>,
}

impl FileAuditLog {
    /// Open or create the log file at `config.path`
    pub fn open(config: FileLogConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    QuillError::unavailable(
                        &format!("failed to create directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&config.path)
            .map_err(|e| {
                QuillError::unavailable(
                    &format!("failed to open audit log file {}", config.path.display()),
                    e,
                )
            })?;

        let meta = file.metadata().map_err(|e| {
            QuillError::unavailable(
                &format!("failed to stat audit log file {}", config.path.display()),
                e,
            )
        })?;
        if !meta.is_file() {
            return Err(QuillError::StorageUnavailable(format!(
                "{} is not a regular file",
                config.path.display()
            )));
        }

        if meta.len() > 0 {
            Self::repair_torn_tail(&mut file)
                .map_err(|e| QuillError::unavailable("failed to check audit log tail", e))?;
        }

        tracing::info!(
            path = %config.path.display(),
            bytes = meta.len(),
            "Opened file audit log"
        );

        Ok(Self {
            config,
            writer: Mutex::new(file),
        })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Terminate a partially written last line so the next record starts
    /// on its own line. The fragment is skipped by readers.
    fn repair_torn_tail(file: &mut File) -> std::io::Result<()> {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            tracing::warn!("Audit log ends with a partial record, terminating it");
            file.write_all(b"\n")?;
            file.sync_data()?;
        }
        Ok(())
    }

    /// Flush and fsync the log file
    pub fn sync(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        writer
            .flush()
            .and_then(|_| writer.sync_all())
            .map_err(|e| QuillError::write("failed to sync audit log", e))
    }

    /// Stamp, serialize and write `event` as one line under the lock, so
    /// file order follows stamped time.
    fn write_event(&self, event: &AuditEvent) -> Result<()> {
        let mut writer = self.writer.lock();

        let mut line = serde_json::to_vec(&event.stamped())
            .map_err(|e| QuillError::write("failed to serialize audit event", e))?;
        line.push(b'\n');

        writer
            .write_all(&line)
            .map_err(|e| QuillError::write("failed to write to audit log file", e))?;
        if self.config.sync_on_append {
            writer
                .sync_data()
                .map_err(|e| QuillError::write("failed to sync audit log file", e))?;
        }
        Ok(())
    }

    /// Scan the whole file; the write lock is held for the duration.
    ///
    /// Matches come back oldest first; records with equal timestamps keep
    /// their file order.
    fn scan(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        let _guard = self.writer.lock();

        let file = File::open(&self.config.path)
            .map_err(|e| QuillError::read("failed to open audit log file", e))?;
        let mut reader = BufReader::new(file);

        let mut events = Vec::new();
        let mut line = Vec::new();
        let mut line_no = 0usize;
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| QuillError::read("error reading audit log", e))?;
            if n == 0 {
                break;
            }
            line_no += 1;

            let record = trim_line(&line);
            if record.is_empty() {
                continue;
            }

            match serde_json::from_slice::<AuditEvent>(record) {
                Ok(event) => {
                    if event.matches(tenant_id, start, end) {
                        events.push(event);
                    }
                }
                Err(e) => {
                    tracing::debug!(line = line_no, error = %e, "Skipping unparsable audit record");
                    observe::record_parse_skip(BACKEND);
                }
            }
        }

        events.sort_by_key(|event| event.occurred_at);
        Ok(events)
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

impl AuditLog for FileAuditLog {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn append(&self, event: &AuditEvent) -> Result<()> {
        let started = Instant::now();
        let result = self.write_event(event);
        observe::record_append(BACKEND, started.elapsed(), result.is_ok());
        result
    }

    fn query(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        let started = Instant::now();
        let result = self.scan(tenant_id, start, end);
        observe::record_query(
            BACKEND,
            started.elapsed(),
            result.as_ref().ok().map(Vec::len),
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (FileAuditLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = FileLogConfig::new(temp_dir.path().join("audit.log"));
        let log = FileAuditLog::open(config).unwrap();
        (log, temp_dir)
    }

    fn event(actor: &str, at: i64, tenant: i64) -> AuditEvent {
        AuditEvent::new(actor, "User logged in", at, tenant)
    }

    #[test]
    fn test_open_creates_file_and_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("audit.log");
        let log = FileAuditLog::open(FileLogConfig::new(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(log.path(), path.as_path());
        assert!(log.query(1, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_open_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileAuditLog::open(FileLogConfig::new(temp_dir.path()));
        assert!(matches!(result, Err(QuillError::StorageUnavailable(_))));
    }

    #[test]
    fn test_append_and_query() {
        let (log, _temp) = setup();

        let with_meta = event("bob", 160, 123)
            .with_detail("Created dashboard")
            .with_metadata(json!({"dashboardId": "dash-123", "tags": ["a", "b"]}));
        log.append(&event("alice", 100, 123)).unwrap();
        log.append(&with_meta).unwrap();
        log.append(&event("charlie", 220, 456)).unwrap();

        let events = log.query(123, 0, 0).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].actor, "alice");
        assert_eq!(events[1], with_meta);

        let events = log.query(456, 0, 1000).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, "charlie");
    }

    #[test]
    fn test_orders_by_time_not_insertion() {
        let (log, _temp) = setup();
        for (actor, at) in [("c", 300), ("a", 100), ("b", 200), ("a2", 100)] {
            log.append(&event(actor, at, 1)).unwrap();
        }

        let actors: Vec<_> = log
            .query(1, 0, 0)
            .unwrap()
            .into_iter()
            .map(|e| e.actor)
            .collect();
        assert_eq!(actors, vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn test_null_metadata_is_not_written() {
        let (log, _temp) = setup();
        let mut with_null = event("alice", 100, 1);
        with_null.metadata = Some(json!(null));
        log.append(&with_null).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(!contents.contains("metadata"));
        assert_eq!(log.query(1, 0, 0).unwrap()[0].metadata, None);
    }

    #[test]
    fn test_one_line_per_record() {
        let (log, _temp) = setup();
        log.append(&event("alice", 100, 1).with_detail("line\nbreak")).unwrap();
        log.append(&event("bob", 101, 1)).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_zero_timestamp_is_stamped() {
        let (log, _temp) = setup();
        let before = now_secs();
        log.append(&event("alice", 0, 1)).unwrap();

        let events = log.query(1, 0, 0).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].occurred_at >= before);
    }

    #[test]
    fn test_skips_malformed_lines() {
        let (log, _temp) = setup();
        log.append(&event("alice", 100, 1)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            file.write_all(b"{not json at all\n\n   \n[1,2,3]\n").unwrap();
        }
        log.append(&event("bob", 200, 1)).unwrap();

        let events = log.query(1, 0, 0).unwrap();
        let actors: Vec<_> = events.iter().map(|e| e.actor.as_str()).collect();
        assert_eq!(actors, vec!["alice", "bob"]);
    }

    #[test]
    fn test_torn_tail_is_terminated_on_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("audit.log");
        std::fs::write(
            &path,
            "{\"actor\":\"alice\",\"action\":\"User logged in\",\"occurred_at\":1,\"tenant_id\":1}\n{\"actor\":\"bo",
        )
        .unwrap();

        let log = FileAuditLog::open(FileLogConfig::new(&path)).unwrap();
        log.append(&event("carol", 3, 1)).unwrap();

        let actors: Vec<_> = log
            .query(1, 0, 0)
            .unwrap()
            .into_iter()
            .map(|e| e.actor)
            .collect();
        assert_eq!(actors, vec!["alice", "carol"]);
    }

    #[test]
    fn test_reopen_keeps_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("audit.log");
        {
            let log = FileAuditLog::open(FileLogConfig::new(&path)).unwrap();
            log.append(&event("alice", 100, 1)).unwrap();
            log.sync().unwrap();
        }

        let log = FileAuditLog::open(FileLogConfig::new(&path).with_sync_on_append(true)).unwrap();
        log.append(&event("bob", 200, 1)).unwrap();
        assert_eq!(log.query(1, 0, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let (log, _temp) = setup();
        let log = Arc::new(log);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let e = event(&format!("worker-{}", t), 1000 + i, 9)
                            .with_detail("x".repeat(512));
                        log.append(&e).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.query(9, 0, 0).unwrap().len(), 400);
        let contents = std::fs::read_to_string(log.path()).unwrap();
        for line in contents.lines() {
            serde_json::from_str::<AuditEvent>(line).unwrap();
        }
    }

    #[test]
    fn test_concurrent_stamping_keeps_file_in_time_order() {
        let (log, _temp) = setup();
        let log = Arc::new(log);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        log.append(&event(&format!("worker-{}", t), 0, 3)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let times: Vec<_> = contents
            .lines()
            .map(|line| serde_json::from_str::<AuditEvent>(line).unwrap().occurred_at)
            .collect();
        assert_eq!(times.len(), 400);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    fn now_secs() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }
}
