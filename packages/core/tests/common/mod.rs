//! Common testing utilities for secretsenv integration tests.

use secretsenv::cloud::{LoaderOptions, SecretLoader, SecretResult};
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

/// Test context that manages temporary files and directories.
#[allow(dead_code)]
pub struct TestContext {
    /// Path to temporary directory
    pub temp_path: PathBuf,
    /// The temporary directory (kept to prevent early deletion)
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new test context with a temporary directory.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a test file with content, creating parent directories.
    pub fn create_file(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let file_path = self.temp_path.join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(file_path)
    }

    /// Create a directory inside the temp directory.
    pub fn create_dir(&self, name: &str) -> anyhow::Result<PathBuf> {
        let dir = self.temp_path.join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// In-memory loader that returns fixed secrets or a fixed failure.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct MockLoader {
    secrets: SecretResult,
    failure: Option<String>,
    calls: Rc<RefCell<Vec<String>>>,
}

#[allow(dead_code)]
impl MockLoader {
    pub fn with_secrets(pairs: &[(&str, &str)]) -> Self {
        Self {
            secrets: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Secret identifiers requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl SecretLoader for MockLoader {
    fn load(&self, secret_id: &str, _options: &LoaderOptions) -> anyhow::Result<SecretResult> {
        self.calls.borrow_mut().push(secret_id.to_string());
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.secrets.clone()),
        }
    }
}
