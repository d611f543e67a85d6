use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{
    errors::LedgerError,
    ledger::{Ledger, CURRENT_SCHEMA_VERSION},
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_DIR: &str = "backups";
const UNREADABLE_MARKER: &str = "unreadable";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Stores the ledger as a single pretty-printed JSON document.
///
/// Writes go to a sibling temp file that is renamed over the target. The
/// previous document is copied into `backups/` first, and only the newest
/// `retention` copies are kept. Backup names are
/// `<stem>_<YYYYmmdd_HHMMSS>_<seq>.json`; `seq` orders copies taken within
/// the same second.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(path: PathBuf, retention: Option<usize>) -> Result<Self> {
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)?;
        Ok(Self {
            backups_dir: parent.join(BACKUP_DIR),
            path,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("ledger")
            .to_string()
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let backup_path = self.next_backup_path(&self.stem());
        fs::copy(&self.path, &backup_path)?;
        self.prune_backups()
    }

    /// First free `<prefix>_<timestamp>_<seq>.json` in the backups directory.
    fn next_backup_path(&self, prefix: &str) -> PathBuf {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut seq = 0u32;
        loop {
            let candidate = self.backups_dir.join(format!(
                "{prefix}_{timestamp}_{seq}.{BACKUP_EXTENSION}"
            ));
            if !candidate.exists() {
                return candidate;
            }
            seq += 1;
        }
    }

    fn prune_backups(&self) -> Result<()> {
        for stale in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale) {
                tracing::warn!(path = %stale.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no ledger document yet; starting empty");
            return Ok(None);
        }
        load_ledger_from_path(&self.path).map(Some)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        self.backup_existing_file()?;
        save_ledger_to_path(ledger, &self.path)?;
        tracing::info!(
            path = %self.path.display(),
            transactions = ledger.transactions.len(),
            "ledger saved"
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Backups belonging to this document, newest first.
    fn list_backups(&self) -> Result<Vec<PathBuf>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", self.stem());
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with(&prefix) {
                entries.push(path);
            }
        }
        entries.sort_by_key(|path| Reverse(parse_backup_stamp(path)));
        Ok(entries)
    }

    /// Moves an unreadable document to `backups/<stem>-unreadable_<timestamp>_<seq>.json`.
    ///
    /// The moved file does not match the backup prefix, so pruning never
    /// removes it.
    fn quarantine(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::create_dir_all(&self.backups_dir)?;
        let target = self.next_backup_path(&format!("{}-{}", self.stem(), UNREADABLE_MARKER));
        fs::rename(&self.path, &target).map_err(|err| {
            LedgerError::Persistence(format!(
                "could not move {} aside: {err}",
                self.path.display()
            ))
        })?;
        tracing::warn!(
            from = %self.path.display(),
            to = %target.display(),
            "moved unreadable ledger document aside"
        );
        Ok(Some(target))
    }
}

/// Writes the ledger to `path` atomically by staging to a temporary file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger document, refusing schema versions newer than this build.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::UnsupportedSchema(ledger.schema_version));
    }
    Ok(ledger)
}

/// Reads the `(timestamp, seq)` ordering key from a backup file name.
///
/// Names without a sequence number (`<stem>_<date>_<time>.json`) sort as `seq` 0.
fn parse_backup_stamp(path: &Path) -> Option<(DateTime<Utc>, u32)> {
    let stem = path.file_stem()?.to_str()?;
    let segments: Vec<&str> = stem.rsplitn(4, '_').collect();
    let (date, time, seq) = match segments.as_slice() {
        [seq, time, date, ..] if is_digits(date, 8) => (*date, *time, seq.parse().ok()?),
        [time, date, ..] => (*date, *time, 0),
        _ => return None,
    };
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()?;
    Some((DateTime::from_naive_utc_and_offset(naive, Utc), seq))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir(retention: usize) -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(temp.path().join("ledger.json"), Some(retention))
            .expect("json storage");
        (storage, temp)
    }

    #[test]
    fn load_before_first_save_is_none() {
        let (storage, _guard) = storage_with_temp_dir(3);
        assert!(storage.load().expect("load").is_none());
    }

    #[test]
    fn backup_stamp_reads_file_name() {
        let parsed = parse_backup_stamp(Path::new("/x/ledger_20240105_093015_2.json"));
        assert_eq!(
            parsed.map(|(ts, seq)| (ts.to_rfc3339(), seq)),
            Some(("2024-01-05T09:30:15+00:00".to_string(), 2))
        );
        let legacy = parse_backup_stamp(Path::new("/x/ledger_20240105_093015.json"));
        assert_eq!(legacy.map(|(_, seq)| seq), Some(0));
        assert!(parse_backup_stamp(Path::new("/x/ledger.json")).is_none());
    }

    #[test]
    fn rapid_saves_keep_distinct_backups() {
        let (storage, _guard) = storage_with_temp_dir(5);
        for _ in 0..4 {
            storage.save(&Ledger::default()).expect("save");
        }
        let backups = storage.list_backups().expect("list");
        assert_eq!(backups.len(), 3);
    }

    #[test]
    fn quarantine_moves_document_out_of_the_way() {
        let (storage, _guard) = storage_with_temp_dir(1);
        assert!(storage.quarantine().expect("nothing to move").is_none());

        fs::write(storage.path(), "{ not json").expect("write");
        let moved = storage.quarantine().expect("quarantine").expect("moved");
        assert!(!storage.path().exists());
        assert_eq!(fs::read_to_string(&moved).expect("read"), "{ not json");
        assert!(moved.starts_with(storage.backups_dir()));

        storage.save(&Ledger::default()).expect("save");
        storage.save(&Ledger::default()).expect("save");
        storage.save(&Ledger::default()).expect("save");
        assert!(moved.exists());
        assert!(!storage.list_backups().expect("list").contains(&moved));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut ledger = Ledger::default();
        ledger.schema_version = CURRENT_SCHEMA_VERSION + 1;
        save_ledger_to_path(&ledger, storage.path()).expect("write");
        assert!(matches!(
            storage.load(),
            Err(LedgerError::UnsupportedSchema(v)) if v == CURRENT_SCHEMA_VERSION + 1
        ));
    }

    #[test]
    fn second_save_backs_up_previous_document() {
        let (storage, _guard) = storage_with_temp_dir(3);
        storage.save(&Ledger::default()).expect("first save");
        assert!(storage.list_backups().expect("list").is_empty());
        storage.save(&Ledger::default()).expect("second save");
        assert_eq!(storage.list_backups().expect("list").len(), 1);
    }
}
