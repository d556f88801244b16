//! Repository interface over the host-owned file reference collection.
//!
//! The tracker never touches a concrete store. It selects references with a
//! predicate and applies each change inside a scoped transaction, so any
//! element store (the SQLite [`Store`](crate::Store), an embedding host, or
//! the in-memory [`MemoryRepository`]) can sit behind it.

use crate::types::FileReference;
use eyre::Result;

/// Write access handed to a unit of work inside a transaction.
pub trait FileWriter {
    /// Persist the given state of a file reference.
    fn save_file(&mut self, file: &FileReference) -> Result<()>;
}

/// Read/select plus transactional write access to file references.
pub trait FileRepository {
    /// Return every reference for which `predicate` holds, in collection order.
    fn select_files(&self, predicate: &dyn Fn(&FileReference) -> bool) -> Result<Vec<FileReference>>;

    /// Apply `work` as one all-or-nothing unit.
    ///
    /// If `work` returns an error nothing it wrote is kept.
    fn transaction<F>(&mut self, work: F) -> Result<()>
    where
        F: FnOnce(&mut dyn FileWriter) -> Result<()>;
}

/// A plain in-memory collection of file references.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    files: Vec<FileReference>,
}

impl MemoryRepository {
    pub fn new(files: Vec<FileReference>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[FileReference] {
        &self.files
    }

    pub fn get(&self, id: &str) -> Option<&FileReference> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn into_files(self) -> Vec<FileReference> {
        self.files
    }
}

/// Staged writes of a single in-memory transaction.
struct StagedWrites {
    files: Vec<FileReference>,
}

impl FileWriter for StagedWrites {
    fn save_file(&mut self, file: &FileReference) -> Result<()> {
        match self.files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file.clone(),
            None => self.files.push(file.clone()),
        }
        Ok(())
    }
}

impl FileRepository for MemoryRepository {
    fn select_files(&self, predicate: &dyn Fn(&FileReference) -> bool) -> Result<Vec<FileReference>> {
        Ok(self.files.iter().filter(|f| predicate(f)).cloned().collect())
    }

    fn transaction<F>(&mut self, work: F) -> Result<()>
    where
        F: FnOnce(&mut dyn FileWriter) -> Result<()>,
    {
        let mut staged = StagedWrites {
            files: self.files.clone(),
        };
        work(&mut staged)?;
        self.files = staged.files;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str) -> FileReference {
        FileReference {
            id: id.to_string(),
            name: format!("{id}.png"),
            path: format!("{id}.png"),
            last_modified: 1000,
            modified: false,
        }
    }

    #[test]
    fn test_select_with_predicate() {
        let mut flagged = file("b");
        flagged.modified = true;
        let repo = MemoryRepository::new(vec![file("a"), flagged, file("c")]);

        let selected = repo.select_files(&|f| f.modified).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "b");

        let all = repo.select_files(&|_| true).unwrap();
        let ids: Vec<_> = all.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_transaction_commits() {
        let mut repo = MemoryRepository::new(vec![file("a")]);
        repo.transaction(|w| {
            let mut f = file("a");
            f.modified = true;
            w.save_file(&f)
        })
        .unwrap();

        assert!(repo.get("a").unwrap().modified);
    }

    #[test]
    fn test_transaction_rolls_back() {
        let mut repo = MemoryRepository::new(vec![file("a")]);
        let result = repo.transaction(|w| {
            let mut f = file("a");
            f.modified = true;
            w.save_file(&f)?;
            w.save_file(&file("new"))?;
            eyre::bail!("write failed")
        });

        assert!(result.is_err());
        assert!(!repo.get("a").unwrap().modified);
        assert!(repo.get("new").is_none());
    }
}
