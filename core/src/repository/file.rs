use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::model::task::Task;
use crate::repository::record::TaskRecord;
use crate::repository::traits::TaskRepository;

pub const DEFAULT_FILE_NAME: &str = "tasks.json";

/// Stores the task list as a JSON array in a single file.
#[derive(Clone, Debug)]
pub struct FileTaskRepository {
    file_path: PathBuf,
}

impl FileTaskRepository {
    /// Opens `<base_dir>/<file_name>`, creating the directory if needed.
    /// A missing file is treated as an empty list.
    pub fn new(base_dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(base_dir)
            .with_context(|| format!("could not create data directory {}", base_dir.display()))?;
        Ok(FileTaskRepository {
            file_path: base_dir.join(file_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_records(&self) -> Result<Vec<TaskRecord>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let records = serde_json::from_reader(reader)
            .with_context(|| format!("{} is not a valid task file", self.file_path.display()))?;
        Ok(records)
    }

    /// Writes to a temporary sibling first and renames it over the real file,
    /// so a failed write never leaves a half-written list behind.
    fn write_records(&self, records: &[TaskRecord]) -> Result<()> {
        let parent = self
            .file_path
            .parent()
            .ok_or_else(|| anyhow!("task file {} has no parent directory", self.file_path.display()))?;
        let file_name = self
            .file_path
            .file_name()
            .ok_or_else(|| anyhow!("task file {} has no file name", self.file_path.display()))?;
        let tmp_path = parent.join(format!(".{}.tmp.{}", file_name.to_string_lossy(), std::process::id()));

        let written = write_file(&tmp_path, records).and_then(|()| {
            fs::rename(&tmp_path, &self.file_path)
                .with_context(|| format!("could not replace {}", self.file_path.display()))
        });
        if written.is_err() && tmp_path.exists() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                log::warn!("event=save_cleanup status=failed error={e}");
            }
        }
        written
    }
}

fn write_file(path: &Path, records: &[TaskRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

impl TaskRepository for FileTaskRepository {
    fn load(&self) -> Result<Vec<Task>> {
        let records = self.read_records()?;
        Ok(records.into_iter().map(TaskRecord::into_task).collect())
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
        self.write_records(&records)
    }
}
