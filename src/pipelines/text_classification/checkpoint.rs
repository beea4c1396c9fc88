use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

/// File name prefix of every checkpoint record
pub static CHECKPOINT_PREFIX: &str = "model";

/// File name of the checkpoint index
pub static INDEX_FILE: &str = "checkpoint.json";

/// The checkpoints currently on disk
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// The step of the most recent checkpoint
    pub latest: Option<usize>,

    /// Steps of all retained checkpoints, oldest first
    pub all: Vec<usize>,
}

/// Saves model records every few steps, retaining only the newest ones
pub struct Checkpointer {
    dir: PathBuf,
    max_to_keep: usize,
    saved: VecDeque<usize>,
}

impl Checkpointer {
    /// Create the checkpoint directory. A `max_to_keep` of zero retains every checkpoint.
    pub fn new<P: AsRef<Path>>(dir: P, max_to_keep: usize) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("Unable to create checkpoint directory {:?}: {}", dir, e))?;

        Ok(Self {
            dir,
            max_to_keep,
            saved: VecDeque::new(),
        })
    }

    /// The path a checkpoint is recorded under, before the recorder adds its extension
    pub fn path_for(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{CHECKPOINT_PREFIX}-{step}"))
    }

    /// Record the model for the given step and prune older checkpoints
    pub fn save<B: Backend, M: Module<B>>(
        &mut self,
        model: &M,
        step: usize,
    ) -> anyhow::Result<PathBuf> {
        let path = self.path_for(step);

        let recorder = CompactRecorder::new();

        Recorder::<B>::record(&recorder, model.clone().into_record(), path.clone())
            .map_err(|e| anyhow!("Unable to save checkpoint {:?}: {}", path, e))?;

        self.register(step)?;

        Ok(path)
    }

    /// Track a newly written checkpoint, removing the oldest ones beyond the limit
    pub(crate) fn register(&mut self, step: usize) -> anyhow::Result<Index> {
        self.saved.retain(|&s| s != step);
        self.saved.push_back(step);

        while self.max_to_keep > 0 && self.saved.len() > self.max_to_keep {
            if let Some(oldest) = self.saved.pop_front() {
                self.remove(oldest)?;
            }
        }

        let index = Index {
            latest: Some(step),
            all: self.saved.iter().copied().collect(),
        };

        fs::write(self.dir.join(INDEX_FILE), serde_json::to_string_pretty(&index)?)?;

        Ok(index)
    }

    fn remove(&self, step: usize) -> anyhow::Result<()> {
        let stem = format!("{CHECKPOINT_PREFIX}-{step}");

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            // The recorder picks the extension, so match on the stem alone
            if name.as_ref() == stem || name.starts_with(&format!("{stem}.")) {
                log::debug!("Removing checkpoint {}", name);
                fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }
}

/// Read the checkpoint index of a directory
pub fn read_index<P: AsRef<Path>>(dir: P) -> anyhow::Result<Index> {
    let json = fs::read_to_string(dir.as_ref().join(INDEX_FILE))?;

    Ok(serde_json::from_str(&json)?)
}
